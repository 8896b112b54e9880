use dashmap::mapref::entry::Entry;
use error_stack::Report;

use kernel::interface::query::ItemQuery;
use kernel::interface::update::ItemModifier;
use kernel::prelude::entity::{CopyIndex, Item, ItemId};
use kernel::KernelError;

use crate::database::memory::{MemoryStore, MemoryTransaction, Undo};

pub struct MemoryItemRepository;

impl ItemQuery for MemoryItemRepository {
    type Transaction = MemoryTransaction;

    fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &ItemId,
    ) -> error_stack::Result<Option<Item>, KernelError> {
        Ok(MemoryItemInternal::find_by_id(con.store(), id))
    }

    fn find_all(&self, con: &mut MemoryTransaction) -> error_stack::Result<Vec<Item>, KernelError> {
        Ok(MemoryItemInternal::find_all(con.store()))
    }

    fn find_available_copy(
        &self,
        con: &mut MemoryTransaction,
        id: &ItemId,
    ) -> error_stack::Result<CopyIndex, KernelError> {
        MemoryItemInternal::find_available_copy(con.store(), id)
    }
}

impl ItemModifier for MemoryItemRepository {
    type Transaction = MemoryTransaction;

    fn create(
        &self,
        con: &mut MemoryTransaction,
        item: &Item,
    ) -> error_stack::Result<(), KernelError> {
        MemoryItemInternal::create(con.store(), item)?;
        con.record(Undo::RemoveItem(item.id().clone()));
        Ok(())
    }

    fn reserve_available_copy(
        &self,
        con: &mut MemoryTransaction,
        id: &ItemId,
    ) -> error_stack::Result<CopyIndex, KernelError> {
        let copy = MemoryItemInternal::reserve_available_copy(con.store(), id)?;
        con.record(Undo::ReleaseCopy(id.clone(), copy));
        Ok(copy)
    }

    fn mark_rented(
        &self,
        con: &mut MemoryTransaction,
        id: &ItemId,
        copy: &CopyIndex,
    ) -> error_stack::Result<(), KernelError> {
        MemoryItemInternal::update(con.store(), id, |item| item.mark_rented(copy))?;
        con.record(Undo::ReleaseCopy(id.clone(), *copy));
        Ok(())
    }

    fn mark_available(
        &self,
        con: &mut MemoryTransaction,
        id: &ItemId,
        copy: &CopyIndex,
    ) -> error_stack::Result<(), KernelError> {
        MemoryItemInternal::update(con.store(), id, |item| item.mark_available(copy))?;
        con.record(Undo::RetakeCopy(id.clone(), *copy));
        Ok(())
    }
}

pub(in crate::database) struct MemoryItemInternal;

impl MemoryItemInternal {
    fn find_by_id(store: &MemoryStore, id: &ItemId) -> Option<Item> {
        store.items.get(id).map(|item| item.value().clone())
    }

    fn find_all(store: &MemoryStore) -> Vec<Item> {
        let mut items: Vec<Item> = store
            .items
            .iter()
            .map(|item| item.value().clone())
            .collect();
        items.sort_by(|a, b| a.id().cmp(b.id()));
        items
    }

    fn find_available_copy(
        store: &MemoryStore,
        id: &ItemId,
    ) -> error_stack::Result<CopyIndex, KernelError> {
        let item = store.items.get(id).ok_or_else(|| not_found(id))?;
        item.lowest_available().ok_or_else(|| no_copy(id))
    }

    fn create(store: &MemoryStore, item: &Item) -> error_stack::Result<(), KernelError> {
        match store.items.entry(item.id().clone()) {
            Entry::Occupied(_) => Err(Report::new(KernelError::DuplicateItem)
                .attach_printable(format!("Item {} already exists", item.id()))),
            Entry::Vacant(entry) => {
                entry.insert(item.clone());
                Ok(())
            }
        }
    }

    /// Lookup and status flip happen under the same entry guard, so two callers
    /// can never reserve the same copy.
    fn reserve_available_copy(
        store: &MemoryStore,
        id: &ItemId,
    ) -> error_stack::Result<CopyIndex, KernelError> {
        let mut item = store.items.get_mut(id).ok_or_else(|| not_found(id))?;
        let copy = item.lowest_available().ok_or_else(|| no_copy(id))?;
        item.mark_rented(&copy)?;
        Ok(copy)
    }

    fn update<F>(store: &MemoryStore, id: &ItemId, f: F) -> error_stack::Result<(), KernelError>
    where
        F: FnOnce(&mut Item) -> error_stack::Result<(), KernelError>,
    {
        let mut item = store.items.get_mut(id).ok_or_else(|| not_found(id))?;
        f(item.value_mut())
    }
}

fn not_found(id: &ItemId) -> Report<KernelError> {
    Report::new(KernelError::ItemNotFound).attach_printable(format!("Item {id} not found"))
}

fn no_copy(id: &ItemId) -> Report<KernelError> {
    Report::new(KernelError::NoCopyAvailable)
        .attach_printable(format!("Every copy of item {id} is rented"))
}

#[cfg(test)]
mod test {
    use std::sync::Barrier;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::ItemQuery;
    use kernel::interface::update::ItemModifier;
    use kernel::prelude::entity::{CopyIndex, CopyStatus, Item, ItemId, ItemTitle};
    use kernel::KernelError;

    use crate::database::{MemoryDatabase, MemoryItemRepository};

    #[test]
    fn test() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact()?;
        let id = ItemId::new("W1");
        let item = Item::create(id.clone(), ItemTitle::new("Omniscient Reader"), 2)?;
        MemoryItemRepository.create(&mut con, &item)?;

        let report = MemoryItemRepository.create(&mut con, &item).unwrap_err();
        assert_eq!(report.current_context(), &KernelError::DuplicateItem);

        let found = MemoryItemRepository.find_by_id(&mut con, &id)?;
        assert_eq!(found, Some(item));

        let first = MemoryItemRepository.reserve_available_copy(&mut con, &id)?;
        let second = MemoryItemRepository.reserve_available_copy(&mut con, &id)?;
        assert_eq!((first, second), (CopyIndex::new(0usize), CopyIndex::new(1usize)));
        let report = MemoryItemRepository
            .reserve_available_copy(&mut con, &id)
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NoCopyAvailable);

        MemoryItemRepository.mark_available(&mut con, &id, &first)?;
        let report = MemoryItemRepository
            .mark_available(&mut con, &id, &first)
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidStateTransition);
        assert_eq!(
            MemoryItemRepository.find_available_copy(&mut con, &id)?,
            first
        );

        let report = MemoryItemRepository
            .find_available_copy(&mut con, &ItemId::new("missing"))
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::ItemNotFound);
        con.commit()
    }

    #[test]
    fn concurrent_reservations_never_share_a_copy() -> error_stack::Result<(), KernelError> {
        const THREADS: usize = 8;
        let db = MemoryDatabase::new();
        let id = ItemId::new("W1");
        let mut con = db.transact()?;
        MemoryItemRepository.create(
            &mut con,
            &Item::create(id.clone(), ItemTitle::new("True Beauty"), 3)?,
        )?;
        con.commit()?;

        let barrier = Barrier::new(THREADS);
        let reserved: Vec<Option<CopyIndex>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        let mut con = db.transact().ok()?;
                        barrier.wait();
                        let copy = MemoryItemRepository
                            .reserve_available_copy(&mut con, &id)
                            .ok()?;
                        con.commit().ok()?;
                        Some(copy)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut won: Vec<CopyIndex> = reserved.into_iter().flatten().collect();
        won.sort();
        assert_eq!(
            won,
            vec![
                CopyIndex::new(0usize),
                CopyIndex::new(1usize),
                CopyIndex::new(2usize)
            ]
        );
        let mut con = db.transact()?;
        let item = MemoryItemRepository.find_by_id(&mut con, &id)?.unwrap();
        assert_eq!(item.copies(), &vec![CopyStatus::Rented; 3]);
        Ok(())
    }
}
