use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{CopyIndex, Item, ItemId};
use crate::KernelError;

pub trait ItemQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &ItemId,
    ) -> error_stack::Result<Option<Item>, KernelError>;
    fn find_all(&self, con: &mut Self::Transaction) -> error_stack::Result<Vec<Item>, KernelError>;
    /// Lowest-indexed available copy. Read only: the copy is not reserved.
    fn find_available_copy(
        &self,
        con: &mut Self::Transaction,
        id: &ItemId,
    ) -> error_stack::Result<CopyIndex, KernelError>;
}

pub trait DependOnItemQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ItemQuery: ItemQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn item_query(&self) -> &Self::ItemQuery;
}
