use crate::KernelError;

/// Tracks whether the current session may still mutate state.
pub trait SessionHealth: 'static + Sync + Send {
    /// Fails with `InvariantViolation` once the session has been halted.
    fn ensure_operational(&self) -> error_stack::Result<(), KernelError>;
    fn halt(&self, cause: &KernelError);
    fn is_halted(&self) -> bool;
}

pub trait DependOnSessionHealth: 'static + Sync + Send {
    type SessionHealth: SessionHealth;
    fn session_health(&self) -> &Self::SessionHealth;
}
