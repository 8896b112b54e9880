use std::collections::{HashMap, HashSet};

use destructure::Destructure;
use error_stack::Report;
use vodca::References;

use crate::entity::{CopyIndex, CopyStatus, Customer, CustomerId, Item, ItemId, RentalRecord};
use crate::KernelError;

/// Full copy of the catalog, the customer registry and the rental ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, References, Destructure)]
pub struct Snapshot {
    items: Vec<Item>,
    customers: Vec<Customer>,
    rentals: Vec<RentalRecord>,
}

impl Snapshot {
    pub fn new(items: Vec<Item>, customers: Vec<Customer>, rentals: Vec<RentalRecord>) -> Self {
        Self {
            items,
            customers,
            rentals,
        }
    }

    /// Checks every cross-collection invariant. Failures are reported as `CorruptState`.
    pub fn validate(&self) -> error_stack::Result<(), KernelError> {
        let mut items: HashMap<&ItemId, &Item> = HashMap::new();
        for item in &self.items {
            if items.insert(item.id(), item).is_some() {
                return Err(corrupt(format!("Duplicate item id {}", item.id())));
            }
            if item.copy_count() == 0 {
                return Err(corrupt(format!("Item {} has no copies", item.id())));
            }
        }

        let mut customers: HashMap<&CustomerId, &Customer> = HashMap::new();
        for customer in &self.customers {
            if customers.insert(customer.id(), customer).is_some() {
                return Err(corrupt(format!("Duplicate customer id {}", customer.id())));
            }
        }

        let mut rental_ids = HashSet::new();
        let mut holders: HashMap<(&ItemId, CopyIndex), usize> = HashMap::new();
        let mut active_per_customer: HashMap<&CustomerId, u32> = HashMap::new();
        for rental in &self.rentals {
            let id = rental.id();
            if !rental_ids.insert(*id) {
                return Err(corrupt(format!("Duplicate rental id {id}")));
            }
            if !customers.contains_key(rental.customer_id()) {
                return Err(corrupt(format!(
                    "Rental {id} references unknown customer {}",
                    rental.customer_id()
                )));
            }
            let item = items.get(rental.item_id()).ok_or_else(|| {
                corrupt(format!(
                    "Rental {id} references unknown item {}",
                    rental.item_id()
                ))
            })?;
            if item.copy_status(rental.copy_index()).is_none() {
                return Err(corrupt(format!(
                    "Rental {id} references copy {} outside item {}",
                    rental.copy_index(),
                    rental.item_id()
                )));
            }
            if rental.due_date().as_ref() < rental.checkout_date().as_ref() {
                return Err(corrupt(format!("Rental {id} is due before its checkout")));
            }
            match (rental.is_active(), rental.returned_at()) {
                (true, Some(_)) => {
                    return Err(corrupt(format!("Active rental {id} has a return date")));
                }
                (false, None) => {
                    return Err(corrupt(format!("Returned rental {id} has no return date")));
                }
                (false, Some(returned)) if returned.as_ref() < rental.checkout_date().as_ref() => {
                    return Err(corrupt(format!(
                        "Rental {id} is returned before its checkout"
                    )));
                }
                _ => {}
            }
            if rental.is_active() {
                *holders
                    .entry((rental.item_id(), *rental.copy_index()))
                    .or_default() += 1;
                *active_per_customer
                    .entry(rental.customer_id())
                    .or_default() += 1;
            }
        }

        for item in &self.items {
            for (index, status) in item.copies().iter().enumerate() {
                let copy = CopyIndex::new(index);
                let held = holders.get(&(item.id(), copy)).copied().unwrap_or(0);
                match (status, held) {
                    (CopyStatus::Rented, 1) | (CopyStatus::Available, 0) => {}
                    _ => {
                        return Err(corrupt(format!(
                            "Copy {copy} of item {} is {status:?} but held by {held} active rentals",
                            item.id()
                        )));
                    }
                }
            }
        }

        for customer in &self.customers {
            let active = active_per_customer
                .get(customer.id())
                .copied()
                .unwrap_or(0);
            if *customer.active_rentals().as_ref() != active {
                return Err(corrupt(format!(
                    "Customer {} records {} active rentals but holds {active}",
                    customer.id(),
                    customer.active_rentals().as_ref()
                )));
            }
        }

        Ok(())
    }
}

fn corrupt(message: String) -> Report<KernelError> {
    Report::new(KernelError::CorruptState).attach_printable(message)
}
