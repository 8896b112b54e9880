use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{CustomerId, RentalId, RentalRecord};
use crate::KernelError;

pub trait RentalQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &RentalId,
    ) -> error_stack::Result<Option<RentalRecord>, KernelError>;
    fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<RentalRecord>, KernelError>;
    /// Every record still in RENTED or OVERDUE.
    fn find_unreturned(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<RentalRecord>, KernelError>;
    fn find_by_customer_id(
        &self,
        con: &mut Self::Transaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Vec<RentalRecord>, KernelError>;
}

pub trait DependOnRentalQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type RentalQuery: RentalQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn rental_query(&self) -> &Self::RentalQuery;
}
