use dashmap::mapref::entry::Entry;
use error_stack::Report;

use kernel::interface::query::CustomerQuery;
use kernel::interface::update::CustomerModifier;
use kernel::prelude::entity::{Customer, CustomerId, RentLimit};
use kernel::KernelError;

use crate::database::memory::{MemoryStore, MemoryTransaction, Undo};

pub struct MemoryCustomerRepository;

impl CustomerQuery for MemoryCustomerRepository {
    type Transaction = MemoryTransaction;

    fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        Ok(con
            .store()
            .customers
            .get(id)
            .map(|customer| customer.value().clone()))
    }

    fn find_all(
        &self,
        con: &mut MemoryTransaction,
    ) -> error_stack::Result<Vec<Customer>, KernelError> {
        let mut customers: Vec<Customer> = con
            .store()
            .customers
            .iter()
            .map(|customer| customer.value().clone())
            .collect();
        customers.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(customers)
    }
}

impl CustomerModifier for MemoryCustomerRepository {
    type Transaction = MemoryTransaction;

    fn create(
        &self,
        con: &mut MemoryTransaction,
        customer: &Customer,
    ) -> error_stack::Result<(), KernelError> {
        MemoryCustomerInternal::create(con.store(), customer)?;
        con.record(Undo::RemoveCustomer(customer.id().clone()));
        Ok(())
    }

    fn hold(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError> {
        con.hold(id)
    }

    fn acquire_slot(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
        limit: &RentLimit,
    ) -> error_stack::Result<(), KernelError> {
        MemoryCustomerInternal::update(con.store(), id, |customer| {
            if !customer.can_rent(limit) {
                return Err(Report::new(KernelError::RentalLimitExceeded).attach_printable(
                    format!(
                        "Customer {id} already holds {} of {} rentals",
                        customer.active_rentals().as_ref(),
                        limit.as_ref()
                    ),
                ));
            }
            customer.increment_active()
        })?;
        con.record(Undo::DecrementActive(id.clone()));
        Ok(())
    }

    fn increment_active(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError> {
        MemoryCustomerInternal::update(con.store(), id, Customer::increment_active)?;
        con.record(Undo::DecrementActive(id.clone()));
        Ok(())
    }

    fn decrement_active(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
    ) -> error_stack::Result<(), KernelError> {
        MemoryCustomerInternal::update(con.store(), id, Customer::decrement_active)?;
        con.record(Undo::IncrementActive(id.clone()));
        Ok(())
    }
}

pub(in crate::database) struct MemoryCustomerInternal;

impl MemoryCustomerInternal {
    fn create(store: &MemoryStore, customer: &Customer) -> error_stack::Result<(), KernelError> {
        match store.customers.entry(customer.id().clone()) {
            Entry::Occupied(_) => Err(Report::new(KernelError::DuplicateCustomer)
                .attach_printable(format!("Customer {} already exists", customer.id()))),
            Entry::Vacant(entry) => {
                entry.insert(customer.clone());
                Ok(())
            }
        }
    }

    fn update<F>(store: &MemoryStore, id: &CustomerId, f: F) -> error_stack::Result<(), KernelError>
    where
        F: FnOnce(&mut Customer) -> error_stack::Result<(), KernelError>,
    {
        let mut customer = store.customers.get_mut(id).ok_or_else(|| {
            Report::new(KernelError::CustomerNotFound)
                .attach_printable(format!("Customer {id} not found"))
        })?;
        f(customer.value_mut())
    }
}
