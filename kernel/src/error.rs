use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    InvalidInput,
    DuplicateItem,
    DuplicateCustomer,
    ItemNotFound,
    CustomerNotFound,
    RentalNotFound,
    NoCopyAvailable,
    RentalLimitExceeded,
    InvalidStateTransition,
    AlreadyReturned,
    CorruptState,
    InvariantViolation,
    Internal,
}

impl KernelError {
    /// Fatal errors poison the session: mutating operations are refused until the
    /// state is reloaded or reset.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KernelError::CorruptState | KernelError::InvariantViolation
        )
    }
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::InvalidInput => write!(f, "Invalid input"),
            KernelError::DuplicateItem => write!(f, "Item already exists"),
            KernelError::DuplicateCustomer => write!(f, "Customer already exists"),
            KernelError::ItemNotFound => write!(f, "Item not found"),
            KernelError::CustomerNotFound => write!(f, "Customer not found"),
            KernelError::RentalNotFound => write!(f, "Rental not found"),
            KernelError::NoCopyAvailable => write!(f, "No copy available"),
            KernelError::RentalLimitExceeded => write!(f, "Rental limit exceeded"),
            KernelError::InvalidStateTransition => write!(f, "Invalid state transition"),
            KernelError::AlreadyReturned => write!(f, "Rental already returned"),
            KernelError::CorruptState => write!(f, "Persisted state is corrupt"),
            KernelError::InvariantViolation => write!(f, "Invariant violated"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
