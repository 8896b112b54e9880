use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use error_stack::{Report, ResultExt};
use parking_lot::{
    ArcMutexGuard, ArcRwLockReadGuard, ArcRwLockWriteGuard, Mutex, RawMutex, RawRwLock, RwLock,
};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::session::SessionHealth;
use kernel::prelude::entity::{
    CopyIndex, Customer, CustomerId, Item, ItemId, RentalId, RentalRecord, Snapshot,
};
use kernel::KernelError;

pub use self::{customer::*, item::*, rental::*};

mod customer;
mod item;
mod rental;

/// Process-local store shared by every operation of one engine.
///
/// Each collection is a `DashMap`, so a write guard on one entry serialises every
/// read-modify-write on that item, customer or rental without blocking the others.
/// Every transaction also holds `gate` shared; an exclusive transaction sees no
/// operation half done.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    store: Arc<MemoryStore>,
}

#[derive(Default)]
pub(in crate::database) struct MemoryStore {
    items: DashMap<ItemId, Item>,
    customers: DashMap<CustomerId, Customer>,
    rentals: DashMap<RentalId, RentalRecord>,
    halted: AtomicBool,
    gate: Arc<RwLock<()>>,
    holds: DashMap<CustomerId, Arc<Mutex<()>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a persisted snapshot. The snapshot is validated first;
    /// nothing is loaded when it is inconsistent.
    pub fn restore(snapshot: Snapshot) -> error_stack::Result<Self, KernelError> {
        snapshot.validate()?;
        let snapshot = snapshot.into_destruct();
        let store = MemoryStore::default();
        for item in snapshot.items {
            store.items.insert(item.id().clone(), item);
        }
        for customer in snapshot.customers {
            store.customers.insert(customer.id().clone(), customer);
        }
        for rental in snapshot.rentals {
            store.rentals.insert(*rental.id(), rental);
        }
        tracing::info!(
            "Restored {} items, {} customers, {} rentals",
            store.items.len(),
            store.customers.len(),
            store.rentals.len()
        );
        Ok(Self {
            store: Arc::new(store),
        })
    }
}

impl DatabaseConnection for MemoryDatabase {
    type Transaction = MemoryTransaction;
    fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let shared = self.store.gate.read_arc();
        Ok(MemoryTransaction::new(
            Arc::clone(&self.store),
            Some(shared),
            None,
        ))
    }

    fn transact_exclusive(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let exclusive = self.store.gate.write_arc();
        Ok(MemoryTransaction::new(
            Arc::clone(&self.store),
            None,
            Some(exclusive),
        ))
    }
}

impl SessionHealth for MemoryDatabase {
    fn ensure_operational(&self) -> error_stack::Result<(), KernelError> {
        if self.store.is_halted() {
            return Err(Report::new(KernelError::InvariantViolation)
                .attach_printable("Session is halted. Reload or reset the state to continue"));
        }
        Ok(())
    }

    fn halt(&self, cause: &KernelError) {
        self.store.halt(cause);
    }

    fn is_halted(&self) -> bool {
        self.store.is_halted()
    }
}

impl MemoryStore {
    fn halt(&self, cause: &KernelError) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            tracing::error!("Session halted: {cause}");
        }
    }

    fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    pub(in crate::database) fn hold_of(
        &self,
        id: &CustomerId,
    ) -> error_stack::Result<Arc<Mutex<()>>, KernelError> {
        if !self.customers.contains_key(id) {
            return Err(Report::new(KernelError::CustomerNotFound)
                .attach_printable(format!("Customer {id} not found")));
        }
        Ok(Arc::clone(self.holds.entry(id.clone()).or_default().value()))
    }
}

/// Compensating action for one modification made inside a transaction.
#[derive(Debug)]
pub(in crate::database) enum Undo {
    RemoveItem(ItemId),
    RemoveCustomer(CustomerId),
    RemoveRental(RentalId),
    ReleaseCopy(ItemId, CopyIndex),
    RetakeCopy(ItemId, CopyIndex),
    IncrementActive(CustomerId),
    DecrementActive(CustomerId),
    RestoreRental(Box<RentalRecord>),
}

impl Undo {
    fn apply(self, store: &MemoryStore) -> error_stack::Result<(), KernelError> {
        let description = format!("{self:?}");
        let applied = match self {
            Undo::RemoveItem(id) => store
                .items
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Report::new(KernelError::ItemNotFound)),
            Undo::RemoveCustomer(id) => store
                .customers
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Report::new(KernelError::CustomerNotFound)),
            Undo::RemoveRental(id) => store
                .rentals
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| Report::new(KernelError::RentalNotFound)),
            Undo::ReleaseCopy(id, copy) => match store.items.get_mut(&id) {
                Some(mut item) => item.mark_available(&copy),
                None => Err(Report::new(KernelError::ItemNotFound)),
            },
            Undo::RetakeCopy(id, copy) => match store.items.get_mut(&id) {
                Some(mut item) => item.mark_rented(&copy),
                None => Err(Report::new(KernelError::ItemNotFound)),
            },
            Undo::IncrementActive(id) => match store.customers.get_mut(&id) {
                Some(mut customer) => customer.increment_active(),
                None => Err(Report::new(KernelError::CustomerNotFound)),
            },
            Undo::DecrementActive(id) => match store.customers.get_mut(&id) {
                Some(mut customer) => customer.decrement_active(),
                None => Err(Report::new(KernelError::CustomerNotFound)),
            },
            Undo::RestoreRental(rental) => {
                store.rentals.insert(*rental.id(), *rental);
                Ok(())
            }
        };
        applied
            .change_context(KernelError::InvariantViolation)
            .attach_printable_lazy(|| format!("Compensation failed: {description}"))
    }
}

/// Unit of work over a [`MemoryDatabase`].
///
/// Changes are applied to the shared store right away and their compensations
/// are kept in an undo log. `roll_back` (or dropping without `commit`) replays
/// the log in reverse. Customer holds and the gate are released after that.
pub struct MemoryTransaction {
    store: Arc<MemoryStore>,
    undo: Vec<Undo>,
    finished: bool,
    held: Vec<(CustomerId, ArcMutexGuard<RawMutex, ()>)>,
    _shared: Option<ArcRwLockReadGuard<RawRwLock, ()>>,
    _exclusive: Option<ArcRwLockWriteGuard<RawRwLock, ()>>,
}

impl MemoryTransaction {
    fn new(
        store: Arc<MemoryStore>,
        shared: Option<ArcRwLockReadGuard<RawRwLock, ()>>,
        exclusive: Option<ArcRwLockWriteGuard<RawRwLock, ()>>,
    ) -> Self {
        Self {
            store,
            undo: Vec::new(),
            finished: false,
            held: Vec::new(),
            _shared: shared,
            _exclusive: exclusive,
        }
    }

    /// Blocks until no other transaction holds `id`. Holding twice is a no-op.
    pub(in crate::database) fn hold(
        &mut self,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError> {
        if self.held.iter().any(|(held, _)| held == id) {
            return Ok(());
        }
        let lock = self.store.hold_of(id)?;
        self.held.push((id.clone(), lock.lock_arc()));
        Ok(())
    }

    pub(in crate::database) fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub(in crate::database) fn record(&mut self, undo: Undo) {
        self.undo.push(undo);
    }

    fn unwind(&mut self) -> error_stack::Result<(), KernelError> {
        while let Some(undo) = self.undo.pop() {
            if let Err(report) = undo.apply(&self.store) {
                self.undo.clear();
                self.store.halt(report.current_context());
                return Err(report);
            }
        }
        Ok(())
    }
}

impl Transaction for MemoryTransaction {
    fn commit(mut self) -> error_stack::Result<(), KernelError> {
        self.undo.clear();
        self.finished = true;
        Ok(())
    }

    fn roll_back(mut self) -> error_stack::Result<(), KernelError> {
        self.finished = true;
        if !self.undo.is_empty() {
            tracing::warn!("Rolling back {} changes", self.undo.len());
        }
        self.unwind()
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if self.finished || self.undo.is_empty() {
            return;
        }
        tracing::warn!(
            "Transaction dropped without commit. Rolling back {} changes",
            self.undo.len()
        );
        if let Err(report) = self.unwind() {
            tracing::error!("{report:?}");
        }
    }
}
