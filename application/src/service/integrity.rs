use error_stack::ResultExt;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::query::{
    CustomerQuery, DependOnCustomerQuery, DependOnItemQuery, DependOnRentalQuery, ItemQuery,
    RentalQuery,
};
use kernel::interface::session::{DependOnSessionHealth, SessionHealth};
use kernel::prelude::entity::Snapshot;
use kernel::KernelError;

pub trait IntegrityService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnItemQuery
    + DependOnCustomerQuery
    + DependOnRentalQuery
    + DependOnSessionHealth
{
    /// Copies the whole store. Waits for operations in flight and holds new ones back
    /// until the copy is taken.
    fn export(&self) -> error_stack::Result<Snapshot, KernelError> {
        let mut con = self.database_connection().transact_exclusive()?;
        let items = self.item_query().find_all(&mut con)?;
        let customers = self.customer_query().find_all(&mut con)?;
        let rentals = self.rental_query().find_all(&mut con)?;
        Ok(Snapshot::new(items, customers, rentals))
    }

    /// Rechecks every cross-entity invariant on the live store. Any mismatch halts
    /// the session.
    fn audit(&self) -> error_stack::Result<(), KernelError> {
        self.checked_export().map(|_| ())
    }

    /// [`export`](IntegrityService::export) followed by the audit of that same copy.
    fn checked_export(&self) -> error_stack::Result<Snapshot, KernelError> {
        let snapshot = self.export()?;
        let audited = snapshot
            .validate()
            .change_context(KernelError::InvariantViolation)
            .attach_printable("Live state failed the integrity audit");
        if let Err(report) = &audited {
            tracing::error!("{report:?}");
            self.session_health().halt(report.current_context());
        } else {
            tracing::debug!(
                "Audit passed: {} items, {} customers, {} rentals",
                snapshot.items().len(),
                snapshot.customers().len(),
                snapshot.rentals().len()
            );
        }
        audited.map(|_| snapshot)
    }
}

impl<T> IntegrityService for T where
    T: DependOnDatabaseConnection
        + DependOnItemQuery
        + DependOnCustomerQuery
        + DependOnRentalQuery
        + DependOnSessionHealth
{
}
