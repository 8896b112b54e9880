use kernel::interface::database::Transaction;
use kernel::interface::session::SessionHealth;
use kernel::KernelError;

pub use self::{catalog::*, customer::*, integrity::*, rental::*};

mod catalog;
mod customer;
mod integrity;
mod rental;

/// Runs `f` inside `con`, committing on success and rolling back on failure.
/// Fatal errors, including a failed roll back, halt the session.
pub(crate) fn atomically<S, C, T, F>(
    session: &S,
    mut con: C,
    f: F,
) -> error_stack::Result<T, KernelError>
where
    S: SessionHealth,
    C: Transaction,
    F: FnOnce(&mut C) -> error_stack::Result<T, KernelError>,
{
    match f(&mut con) {
        Ok(value) => {
            con.commit()?;
            Ok(value)
        }
        Err(report) => {
            if let Err(failed) = con.roll_back() {
                tracing::error!("Roll back failed: {failed:?}");
                session.halt(failed.current_context());
            }
            let cause = *report.current_context();
            if cause.is_fatal() {
                tracing::error!("{report:?}");
                session.halt(&cause);
            }
            Err(report)
        }
    }
}
