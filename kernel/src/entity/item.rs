mod copy;
mod id;
mod title;

pub use self::{copy::*, id::*, title::*};
use crate::KernelError;
use destructure::Destructure;
use error_stack::Report;
use vodca::References;

/// A rentable title together with the status of each of its copies.
///
/// Copies are created with the item and never removed; only their status changes.
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure)]
pub struct Item {
    id: ItemId,
    title: ItemTitle,
    copies: Vec<CopyStatus>,
}

impl Item {
    pub fn new(id: ItemId, title: ItemTitle, copies: Vec<CopyStatus>) -> Self {
        Self { id, title, copies }
    }

    /// Builds an item whose `copy_count` copies are all available.
    pub fn create(
        id: ItemId,
        title: ItemTitle,
        copy_count: i64,
    ) -> error_stack::Result<Self, KernelError> {
        if id.as_ref().trim().is_empty() {
            return Err(
                Report::new(KernelError::InvalidInput).attach_printable("Item id must not be blank")
            );
        }
        if copy_count <= 0 {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable(format!("Copy count must be positive. Given: {copy_count}")));
        }
        let copy_count = usize::try_from(copy_count).map_err(|e| {
            Report::new(e)
                .change_context(KernelError::InvalidInput)
                .attach_printable(format!("Copy count out of range. Given: {copy_count}"))
        })?;
        Ok(Self::new(id, title, vec![CopyStatus::Available; copy_count]))
    }

    pub fn copy_count(&self) -> usize {
        self.copies.len()
    }

    pub fn rented_count(&self) -> usize {
        self.copies
            .iter()
            .filter(|status| **status == CopyStatus::Rented)
            .count()
    }

    pub fn available_count(&self) -> usize {
        self.copy_count() - self.rented_count()
    }

    pub fn copy_status(&self, index: &CopyIndex) -> Option<&CopyStatus> {
        self.copies.get(*index.as_ref())
    }

    /// Lowest-indexed available copy, if any.
    pub fn lowest_available(&self) -> Option<CopyIndex> {
        self.copies
            .iter()
            .position(|status| *status == CopyStatus::Available)
            .map(CopyIndex::new)
    }

    pub fn mark_rented(&mut self, index: &CopyIndex) -> error_stack::Result<(), KernelError> {
        self.transition(index, CopyStatus::Available, CopyStatus::Rented)
    }

    pub fn mark_available(&mut self, index: &CopyIndex) -> error_stack::Result<(), KernelError> {
        self.transition(index, CopyStatus::Rented, CopyStatus::Available)
    }

    fn transition(
        &mut self,
        index: &CopyIndex,
        from: CopyStatus,
        to: CopyStatus,
    ) -> error_stack::Result<(), KernelError> {
        let id = &self.id;
        let status = self.copies.get_mut(*index.as_ref()).ok_or_else(|| {
            Report::new(KernelError::InvalidInput)
                .attach_printable(format!("Item {id} has no copy {index}"))
        })?;
        if *status != from {
            return Err(Report::new(KernelError::InvalidStateTransition)
                .attach_printable(format!("Copy {index} of item {id} is already {status:?}")));
        }
        *status = to;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::entity::{CopyIndex, CopyStatus, Item, ItemId, ItemTitle};
    use crate::KernelError;

    fn item(copies: i64) -> Item {
        Item::create(ItemId::new("W1"), ItemTitle::new("Tower of God"), copies).unwrap()
    }

    #[test]
    fn create_makes_every_copy_available() {
        let item = item(3);
        assert_eq!(item.copy_count(), 3);
        assert_eq!(item.available_count(), 3);
        assert!(item
            .copies()
            .iter()
            .all(|status| *status == CopyStatus::Available));
    }

    #[test]
    fn create_rejects_non_positive_copy_count() {
        for count in [0, -1] {
            let report = Item::create(ItemId::new("W1"), ItemTitle::new("t"), count).unwrap_err();
            assert_eq!(report.current_context(), &KernelError::InvalidInput);
        }
    }

    #[test]
    fn create_rejects_blank_id() {
        let report = Item::create(ItemId::new("  "), ItemTitle::new("t"), 1).unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidInput);
    }

    #[test]
    fn lowest_available_skips_rented_copies() -> error_stack::Result<(), KernelError> {
        let mut item = item(3);
        assert_eq!(item.lowest_available(), Some(CopyIndex::new(0usize)));
        item.mark_rented(&CopyIndex::new(0usize))?;
        item.mark_rented(&CopyIndex::new(2usize))?;
        assert_eq!(item.lowest_available(), Some(CopyIndex::new(1usize)));
        item.mark_rented(&CopyIndex::new(1usize))?;
        assert_eq!(item.lowest_available(), None);
        assert_eq!(item.rented_count(), 3);
        Ok(())
    }

    #[test]
    fn marking_twice_is_an_invalid_transition() -> error_stack::Result<(), KernelError> {
        let mut item = item(1);
        let copy = CopyIndex::new(0usize);
        item.mark_rented(&copy)?;
        let report = item.mark_rented(&copy).unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidStateTransition);

        item.mark_available(&copy)?;
        let report = item.mark_available(&copy).unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidStateTransition);
        Ok(())
    }

    #[test]
    fn unknown_copy_is_invalid_input() {
        let mut item = item(1);
        let report = item.mark_rented(&CopyIndex::new(5usize)).unwrap_err();
        assert_eq!(report.current_context(), &KernelError::InvalidInput);
    }
}
