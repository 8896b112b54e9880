use error_stack::{Report, ResultExt};
use time::Date;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::policy::DependOnRentalPolicy;
use kernel::interface::query::{
    CustomerQuery, DependOnCustomerQuery, DependOnRentalQuery, RentalQuery,
};
use kernel::interface::session::{DependOnSessionHealth, SessionHealth};
use kernel::interface::update::{
    CustomerModifier, DependOnCustomerModifier, DependOnItemModifier, DependOnRentalModifier,
    ItemModifier, RentalModifier,
};
use kernel::prelude::entity::{CustomerId, ItemId, RentalId, RentalRecord};
use kernel::KernelError;

use crate::service::atomically;
use crate::transfer::{
    CheckoutDto, CustomerRentalsDto, GetRentalDto, OverdueRentals, RentalDto, ReturnDto,
    ReturnedDto,
};

/// The rental ledger: RENTED → RETURNED, with OVERDUE derived from the due date.
pub trait RentalService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnItemModifier
    + DependOnCustomerQuery
    + DependOnCustomerModifier
    + DependOnRentalQuery
    + DependOnRentalModifier
    + DependOnSessionHealth
    + DependOnRentalPolicy
{
    /// Reserves the lowest available copy, takes a rental slot from the customer and
    /// opens a record due `loan_period` days after `today`. All or nothing.
    ///
    /// Checkouts of one customer run one at a time, so a refused checkout never
    /// shows its slot to another.
    fn checkout(&self, dto: CheckoutDto) -> error_stack::Result<RentalDto, KernelError> {
        self.session_health().ensure_operational()?;
        let customer_id = CustomerId::new(dto.customer_id);
        let item_id = ItemId::new(dto.item_id);
        let today = dto.today;
        let policy = self.rental_policy();

        let con = self.database_connection().transact()?;
        let opened = atomically(self.session_health(), con, |con| {
            self.customer_modifier().hold(con, &customer_id)?;
            let customer = self
                .customer_query()
                .find_by_id(con, &customer_id)?
                .ok_or_else(|| {
                    Report::new(KernelError::CustomerNotFound)
                        .attach_printable(format!("Customer {customer_id} not found"))
                })?;
            if !customer.can_rent(policy.rent_limit()) {
                return Err(Report::new(KernelError::RentalLimitExceeded).attach_printable(
                    format!(
                        "Customer {customer_id} already holds {} rentals",
                        customer.active_rentals().as_ref()
                    ),
                ));
            }
            let copy = self
                .item_modifier()
                .reserve_available_copy(con, &item_id)?;
            self.customer_modifier()
                .acquire_slot(con, &customer_id, policy.rent_limit())?;
            let rental = RentalRecord::open(
                RentalId::new(Uuid::new_v4()),
                customer_id.clone(),
                item_id.clone(),
                copy,
                today,
                policy.loan_period(),
            )?;
            self.rental_modifier().create(con, &rental)?;
            Ok(rental)
        });
        match &opened {
            Ok(rental) => tracing::info!(
                "Rental {} opened: copy {} of {item_id} to {customer_id}, due {}",
                rental.id(),
                rental.copy_index(),
                rental.due_date().as_ref()
            ),
            Err(report) => tracing::debug!(
                "Checkout of {item_id} by {customer_id} refused: {}",
                report.current_context()
            ),
        }
        Ok(RentalDto::new(opened?, &today))
    }

    /// Closes the rental on `today`, frees its copy and charges the overdue fee.
    fn return_item(&self, dto: ReturnDto) -> error_stack::Result<ReturnedDto, KernelError> {
        self.session_health().ensure_operational()?;
        let id = RentalId::new(dto.rental_id);
        let today = dto.today;

        let con = self.database_connection().transact()?;
        let (rental, fee) = atomically(self.session_health(), con, |con| {
            let rental = self
                .rental_query()
                .find_by_id(con, &id)?
                .ok_or_else(|| rental_not_found(&id))?;
            if !rental.is_active() {
                return Err(Report::new(KernelError::AlreadyReturned)
                    .attach_printable(format!("Rental {id} is already returned")));
            }
            let fee = self
                .rental_policy()
                .compute_fee(rental.due_date(), &today);
            // A concurrent return of the same rental loses here with AlreadyReturned.
            let rental = self.rental_modifier().complete(con, &id, today, fee)?;
            self.item_modifier()
                .mark_available(con, rental.item_id(), rental.copy_index())
                .change_context(KernelError::InvariantViolation)
                .attach_printable_lazy(|| {
                    format!(
                        "Copy {} of item {} held by rental {id} was not rented",
                        rental.copy_index(),
                        rental.item_id()
                    )
                })?;
            self.customer_modifier()
                .decrement_active(con, rental.customer_id())
                .change_context(KernelError::InvariantViolation)
                .attach_printable_lazy(|| {
                    format!("Customer {} of rental {id} holds no rentals", rental.customer_id())
                })?;
            Ok((rental, fee))
        })?;
        if fee.is_zero() {
            tracing::info!("Rental {id} returned on {today} by {}", rental.customer_id());
        } else {
            tracing::info!(
                "Rental {id} returned late on {today} by {}, fee {fee}",
                rental.customer_id()
            );
        }
        Ok(ReturnedDto {
            rental: RentalDto::new(rental, &today),
            fee: fee.into(),
        })
    }

    /// Every rental overdue as of `today`, earliest due date first. Read only.
    fn query_overdue(&self, today: Date) -> error_stack::Result<OverdueRentals, KernelError> {
        let mut con = self.database_connection().transact()?;
        let unreturned = self.rental_query().find_unreturned(&mut con)?;
        Ok(OverdueRentals::new(
            today,
            self.rental_policy().clone(),
            unreturned,
        ))
    }

    fn get_rental(&self, dto: GetRentalDto) -> error_stack::Result<Option<RentalDto>, KernelError> {
        let mut con = self.database_connection().transact()?;
        let rental = self
            .rental_query()
            .find_by_id(&mut con, &RentalId::new(dto.id))?;
        Ok(rental.map(|rental| RentalDto::new(rental, &dto.today)))
    }

    /// Rentals the customer still holds, oldest checkout first.
    fn active_rentals_of(
        &self,
        dto: CustomerRentalsDto,
    ) -> error_stack::Result<Vec<RentalDto>, KernelError> {
        let customer_id = CustomerId::new(dto.customer_id);
        let mut con = self.database_connection().transact()?;
        if self
            .customer_query()
            .find_by_id(&mut con, &customer_id)?
            .is_none()
        {
            return Err(Report::new(KernelError::CustomerNotFound)
                .attach_printable(format!("Customer {customer_id} not found")));
        }
        let rentals = self
            .rental_query()
            .find_by_customer_id(&mut con, &customer_id)?;
        Ok(rentals
            .into_iter()
            .filter(RentalRecord::is_active)
            .map(|rental| RentalDto::new(rental, &dto.today))
            .collect())
    }

    /// Fee accrued so far for an open rental, or the fee charged for a returned one.
    fn assess_fee(&self, dto: GetRentalDto) -> error_stack::Result<u64, KernelError> {
        let id = RentalId::new(dto.id);
        let mut con = self.database_connection().transact()?;
        let rental = self
            .rental_query()
            .find_by_id(&mut con, &id)?
            .ok_or_else(|| rental_not_found(&id))?;
        let fee = match (rental.fee(), rental.returned_at()) {
            (Some(charged), _) => *charged,
            (None, Some(returned)) => self
                .rental_policy()
                .compute_fee(rental.due_date(), returned.as_ref()),
            (None, None) => self
                .rental_policy()
                .compute_fee(rental.due_date(), &dto.today),
        };
        Ok(fee.into())
    }
}

impl<T> RentalService for T where
    T: DependOnDatabaseConnection
        + DependOnItemModifier
        + DependOnCustomerQuery
        + DependOnCustomerModifier
        + DependOnRentalQuery
        + DependOnRentalModifier
        + DependOnSessionHealth
        + DependOnRentalPolicy
{
}

fn rental_not_found(id: &RentalId) -> Report<KernelError> {
    Report::new(KernelError::RentalNotFound).attach_printable(format!("Rental {id} not found"))
}
