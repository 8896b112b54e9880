use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{CopyIndex, Item, ItemId};
use crate::KernelError;

pub trait ItemModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    fn create(&self, con: &mut Self::Transaction, item: &Item)
        -> error_stack::Result<(), KernelError>;
    /// Finds the lowest-indexed available copy and marks it rented as one atomic step.
    fn reserve_available_copy(
        &self,
        con: &mut Self::Transaction,
        id: &ItemId,
    ) -> error_stack::Result<CopyIndex, KernelError>;
    fn mark_rented(
        &self,
        con: &mut Self::Transaction,
        id: &ItemId,
        copy: &CopyIndex,
    ) -> error_stack::Result<(), KernelError>;
    fn mark_available(
        &self,
        con: &mut Self::Transaction,
        id: &ItemId,
        copy: &CopyIndex,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnItemModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type ItemModifier: ItemModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn item_modifier(&self) -> &Self::ItemModifier;
}
