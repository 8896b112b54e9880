use time::Date;

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Fee, RentalId, RentalRecord};
use crate::KernelError;

pub trait RentalModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    fn create(
        &self,
        con: &mut Self::Transaction,
        rental: &RentalRecord,
    ) -> error_stack::Result<(), KernelError>;
    /// Moves the record to RETURNED. Serialised per rental id: of two concurrent
    /// callers, the second observes `AlreadyReturned`.
    fn complete(
        &self,
        con: &mut Self::Transaction,
        id: &RentalId,
        returned_on: Date,
        fee: Fee,
    ) -> error_stack::Result<RentalRecord, KernelError>;
}

pub trait DependOnRentalModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type RentalModifier: RentalModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn rental_modifier(&self) -> &Self::RentalModifier;
}
