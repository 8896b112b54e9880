mod active;
mod id;
mod name;

pub use self::{active::*, id::*, name::*};
use crate::entity::RentLimit;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use error_stack::Report;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Customer {
    id: CustomerId,
    name: CustomerName,
    active_rentals: ActiveRentals,
}

impl Customer {
    pub fn new(id: CustomerId, name: CustomerName, active_rentals: ActiveRentals) -> Self {
        Self {
            id,
            name,
            active_rentals,
        }
    }

    /// A freshly registered customer holding no rentals.
    pub fn register(id: CustomerId, name: CustomerName) -> error_stack::Result<Self, KernelError> {
        if id.as_ref().trim().is_empty() {
            return Err(Report::new(KernelError::InvalidInput)
                .attach_printable("Customer id must not be blank"));
        }
        Ok(Self::new(id, name, ActiveRentals::default()))
    }

    pub fn can_rent(&self, limit: &RentLimit) -> bool {
        self.active_rentals.as_ref() < limit.as_ref()
    }

    pub fn increment_active(&mut self) -> error_stack::Result<(), KernelError> {
        let id = &self.id;
        let next = self.active_rentals.as_ref().checked_add(1).ok_or_else(|| {
            Report::new(KernelError::InvariantViolation)
                .attach_printable(format!("Active rental count of {id} overflowed"))
        })?;
        self.substitute(|customer| *customer.active_rentals = ActiveRentals::new(next));
        Ok(())
    }

    /// Going below zero means the ledger lost track of a rental.
    pub fn decrement_active(&mut self) -> error_stack::Result<(), KernelError> {
        let id = &self.id;
        let next = self.active_rentals.as_ref().checked_sub(1).ok_or_else(|| {
            Report::new(KernelError::InvariantViolation)
                .attach_printable(format!("Active rental count of {id} would drop below zero"))
        })?;
        self.substitute(|customer| *customer.active_rentals = ActiveRentals::new(next));
        Ok(())
    }
}
