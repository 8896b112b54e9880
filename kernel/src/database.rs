use time::Date;

use crate::entity::Snapshot;
use crate::KernelError;

pub trait DatabaseConnection: 'static + Sync + Send {
    type Transaction: Transaction;
    fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError>;
    /// Waits until every open transaction has ended and keeps new ones out until
    /// the returned one ends.
    fn transact_exclusive(&self) -> error_stack::Result<Self::Transaction, KernelError>;
}

pub trait DependOnDatabaseConnection: 'static + Sync + Send {
    type DatabaseConnection: DatabaseConnection;
    fn database_connection(&self) -> &Self::DatabaseConnection;
}

impl<T> DependOnDatabaseConnection for T
where
    T: DatabaseConnection,
{
    type DatabaseConnection = T;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        self
    }
}

/// Unit of work over the store. Modifications are visible as soon as they are made;
/// `roll_back` undoes them in reverse order. Dropping without `commit` rolls back.
/// A transaction stays on the thread that opened it.
pub trait Transaction: 'static {
    fn commit(self) -> error_stack::Result<(), KernelError>;
    fn roll_back(self) -> error_stack::Result<(), KernelError>;
}

/// Load/save contract of the persistence collaborator.
pub trait SnapshotGateway: 'static + Sync + Send {
    fn load(&self) -> error_stack::Result<Snapshot, KernelError>;
    /// `as_of` decides which unreturned rentals are written as OVERDUE.
    fn save(&self, snapshot: &Snapshot, as_of: &Date) -> error_stack::Result<(), KernelError>;
}
