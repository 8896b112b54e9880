use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Customer, CustomerId, RentLimit};
use crate::KernelError;

pub trait CustomerModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    fn create(
        &self,
        con: &mut Self::Transaction,
        customer: &Customer,
    ) -> error_stack::Result<(), KernelError>;
    /// Serialises this transaction with every other one holding the same customer,
    /// until it ends.
    fn hold(
        &self,
        con: &mut Self::Transaction,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError>;
    /// Checks the limit and increments the active count as one atomic step.
    fn acquire_slot(
        &self,
        con: &mut Self::Transaction,
        id: &CustomerId,
        limit: &RentLimit,
    ) -> error_stack::Result<(), KernelError>;
    fn increment_active(
        &self,
        con: &mut Self::Transaction,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError>;
    fn decrement_active(
        &self,
        con: &mut Self::Transaction,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnCustomerModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type CustomerModifier: CustomerModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn customer_modifier(&self) -> &Self::CustomerModifier;
}
