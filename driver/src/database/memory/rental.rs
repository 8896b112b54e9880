use dashmap::mapref::entry::Entry;
use error_stack::Report;
use time::Date;

use kernel::interface::query::RentalQuery;
use kernel::interface::update::RentalModifier;
use kernel::prelude::entity::{CustomerId, Fee, RentalId, RentalRecord};
use kernel::KernelError;

use crate::database::memory::{MemoryStore, MemoryTransaction, Undo};

pub struct MemoryRentalRepository;

impl RentalQuery for MemoryRentalRepository {
    type Transaction = MemoryTransaction;

    fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &RentalId,
    ) -> error_stack::Result<Option<RentalRecord>, KernelError> {
        Ok(con
            .store()
            .rentals
            .get(id)
            .map(|rental| rental.value().clone()))
    }

    fn find_all(
        &self,
        con: &mut MemoryTransaction,
    ) -> error_stack::Result<Vec<RentalRecord>, KernelError> {
        Ok(MemoryRentalInternal::collect(con.store(), |_| true))
    }

    fn find_unreturned(
        &self,
        con: &mut MemoryTransaction,
    ) -> error_stack::Result<Vec<RentalRecord>, KernelError> {
        let mut rentals = MemoryRentalInternal::collect(con.store(), RentalRecord::is_active);
        rentals.sort_by(|a, b| (a.due_date(), a.id()).cmp(&(b.due_date(), b.id())));
        Ok(rentals)
    }

    fn find_by_customer_id(
        &self,
        con: &mut MemoryTransaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Vec<RentalRecord>, KernelError> {
        Ok(MemoryRentalInternal::collect(con.store(), |rental| {
            rental.customer_id() == customer_id
        }))
    }
}

impl RentalModifier for MemoryRentalRepository {
    type Transaction = MemoryTransaction;

    fn create(
        &self,
        con: &mut MemoryTransaction,
        rental: &RentalRecord,
    ) -> error_stack::Result<(), KernelError> {
        MemoryRentalInternal::create(con.store(), rental)?;
        con.record(Undo::RemoveRental(*rental.id()));
        Ok(())
    }

    fn complete(
        &self,
        con: &mut MemoryTransaction,
        id: &RentalId,
        returned_on: Date,
        fee: Fee,
    ) -> error_stack::Result<RentalRecord, KernelError> {
        let (before, after) = MemoryRentalInternal::complete(con.store(), id, returned_on, fee)?;
        con.record(Undo::RestoreRental(Box::new(before)));
        Ok(after)
    }
}

pub(in crate::database) struct MemoryRentalInternal;

impl MemoryRentalInternal {
    /// Matching records ordered by checkout date, then id.
    fn collect<F>(store: &MemoryStore, filter: F) -> Vec<RentalRecord>
    where
        F: Fn(&RentalRecord) -> bool,
    {
        let mut rentals: Vec<RentalRecord> = store
            .rentals
            .iter()
            .filter(|rental| filter(rental.value()))
            .map(|rental| rental.value().clone())
            .collect();
        rentals.sort_by(|a, b| (a.checkout_date(), a.id()).cmp(&(b.checkout_date(), b.id())));
        rentals
    }

    fn create(store: &MemoryStore, rental: &RentalRecord) -> error_stack::Result<(), KernelError> {
        match store.rentals.entry(*rental.id()) {
            Entry::Occupied(_) => Err(Report::new(KernelError::InvariantViolation)
                .attach_printable(format!("Rental id {} is already taken", rental.id()))),
            Entry::Vacant(entry) => {
                entry.insert(rental.clone());
                Ok(())
            }
        }
    }

    /// Returns the record before and after the transition.
    fn complete(
        store: &MemoryStore,
        id: &RentalId,
        returned_on: Date,
        fee: Fee,
    ) -> error_stack::Result<(RentalRecord, RentalRecord), KernelError> {
        let mut rental = store.rentals.get_mut(id).ok_or_else(|| {
            Report::new(KernelError::RentalNotFound)
                .attach_printable(format!("Rental {id} not found"))
        })?;
        let before = rental.value().clone();
        rental.complete(returned_on, fee)?;
        Ok((before, rental.value().clone()))
    }
}
