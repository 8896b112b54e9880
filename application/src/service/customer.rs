use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::policy::DependOnRentalPolicy;
use kernel::interface::query::{CustomerQuery, DependOnCustomerQuery};
use kernel::interface::session::{DependOnSessionHealth, SessionHealth};
use kernel::interface::update::{CustomerModifier, DependOnCustomerModifier};
use kernel::prelude::entity::{Customer, CustomerId, CustomerName};
use kernel::KernelError;

use crate::service::atomically;
use crate::transfer::{CreateCustomerDto, CustomerDto, GetCustomerDto};

pub trait CustomerService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnCustomerQuery
    + DependOnCustomerModifier
    + DependOnSessionHealth
    + DependOnRentalPolicy
{
    fn register_customer(
        &self,
        dto: CreateCustomerDto,
    ) -> error_stack::Result<CustomerDto, KernelError> {
        self.session_health().ensure_operational()?;
        let customer = Customer::register(CustomerId::new(dto.id), CustomerName::new(dto.name))?;
        let con = self.database_connection().transact()?;
        atomically(self.session_health(), con, |con| {
            self.customer_modifier().create(con, &customer)
        })?;
        tracing::info!("Registered customer {}", customer.id());
        Ok(CustomerDto::from(customer))
    }

    fn get_customer(
        &self,
        dto: GetCustomerDto,
    ) -> error_stack::Result<Option<CustomerDto>, KernelError> {
        let mut con = self.database_connection().transact()?;
        let customer = self
            .customer_query()
            .find_by_id(&mut con, &CustomerId::new(dto.id))?;
        Ok(customer.map(CustomerDto::from))
    }

    fn list_customers(&self) -> error_stack::Result<Vec<CustomerDto>, KernelError> {
        let mut con = self.database_connection().transact()?;
        let customers = self.customer_query().find_all(&mut con)?;
        Ok(customers.into_iter().map(CustomerDto::from).collect())
    }

    /// Whether the customer is below the concurrent rental limit.
    fn can_rent(&self, dto: GetCustomerDto) -> error_stack::Result<bool, KernelError> {
        let id = CustomerId::new(dto.id);
        let mut con = self.database_connection().transact()?;
        let customer = self
            .customer_query()
            .find_by_id(&mut con, &id)?
            .ok_or_else(|| {
                Report::new(KernelError::CustomerNotFound)
                    .attach_printable(format!("Customer {id} not found"))
            })?;
        Ok(customer.can_rent(self.rental_policy().rent_limit()))
    }

    fn increment_active(&self, dto: GetCustomerDto) -> error_stack::Result<(), KernelError> {
        self.session_health().ensure_operational()?;
        let id = CustomerId::new(dto.id);
        let con = self.database_connection().transact()?;
        atomically(self.session_health(), con, |con| {
            self.customer_modifier().increment_active(con, &id)
        })
    }

    /// Dropping below zero is an `InvariantViolation` and halts the session.
    fn decrement_active(&self, dto: GetCustomerDto) -> error_stack::Result<(), KernelError> {
        self.session_health().ensure_operational()?;
        let id = CustomerId::new(dto.id);
        let con = self.database_connection().transact()?;
        atomically(self.session_health(), con, |con| {
            self.customer_modifier().decrement_active(con, &id)
        })
    }
}

impl<T> CustomerService for T where
    T: DependOnDatabaseConnection
        + DependOnCustomerQuery
        + DependOnCustomerModifier
        + DependOnSessionHealth
        + DependOnRentalPolicy
{
}
