mod date;
mod id;
mod returned_at;
mod status;

pub use self::{date::*, id::*, returned_at::*, status::*};
use crate::entity::{CopyIndex, CustomerId, Fee, ItemId, LoanPeriod};
use crate::KernelError;
use destructure::{Destructure, Mutation};
use error_stack::Report;
use time::{Date, Duration};
use vodca::References;

/// One checkout-to-return cycle of a single copy.
///
/// The stored status is either `Rented` or `Returned`; `Overdue` is derived from
/// the due date through [`RentalRecord::effective_status`].
#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct RentalRecord {
    id: RentalId,
    customer_id: CustomerId,
    item_id: ItemId,
    copy_index: CopyIndex,
    checkout_date: CheckoutDate,
    due_date: DueDate,
    returned_at: Option<ReturnedAt>,
    status: RentalStatus,
    fee: Option<Fee>,
}

impl RentalRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RentalId,
        customer_id: CustomerId,
        item_id: ItemId,
        copy_index: CopyIndex,
        checkout_date: CheckoutDate,
        due_date: DueDate,
        returned_at: Option<ReturnedAt>,
        status: RentalStatus,
        fee: Option<Fee>,
    ) -> Self {
        Self {
            id,
            customer_id,
            item_id,
            copy_index,
            checkout_date,
            due_date,
            returned_at,
            status,
            fee,
        }
    }

    /// Opens a rental on `today`, due `loan_period` days later.
    pub fn open(
        id: RentalId,
        customer_id: CustomerId,
        item_id: ItemId,
        copy_index: CopyIndex,
        today: Date,
        loan_period: &LoanPeriod,
    ) -> error_stack::Result<Self, KernelError> {
        let days = i64::from(*loan_period.as_ref());
        let due = today.checked_add(Duration::days(days)).ok_or_else(|| {
            Report::new(KernelError::InvalidInput)
                .attach_printable(format!("Due date overflows. Checkout: {today}, loan: {days} days"))
        })?;
        Ok(Self::new(
            id,
            customer_id,
            item_id,
            copy_index,
            CheckoutDate::new(today),
            DueDate::new(due),
            None,
            RentalStatus::Rented,
            None,
        ))
    }

    /// RENTED or OVERDUE; the record still holds its copy.
    pub fn is_active(&self) -> bool {
        self.status != RentalStatus::Returned
    }

    pub fn effective_status(&self, today: &Date) -> RentalStatus {
        match self.status {
            RentalStatus::Returned => RentalStatus::Returned,
            _ if today > self.due_date.as_ref() => RentalStatus::Overdue,
            _ => RentalStatus::Rented,
        }
    }

    pub fn is_overdue(&self, today: &Date) -> bool {
        self.effective_status(today) == RentalStatus::Overdue
    }

    /// Whole days between the due date and `today`; negative once overdue.
    pub fn days_until_due(&self, today: &Date) -> i64 {
        (*self.due_date.as_ref() - *today).whole_days()
    }

    pub fn days_late(&self, today: &Date) -> i64 {
        (-self.days_until_due(today)).max(0)
    }

    /// RENTED/OVERDUE → RETURNED. Terminal: a returned record never transitions again.
    pub fn complete(&mut self, today: Date, fee: Fee) -> error_stack::Result<(), KernelError> {
        let id = self.id;
        if !self.is_active() {
            return Err(Report::new(KernelError::AlreadyReturned)
                .attach_printable(format!("Rental {id} is already returned")));
        }
        if today < *self.checkout_date.as_ref() {
            return Err(Report::new(KernelError::InvalidInput).attach_printable(format!(
                "Rental {id} cannot be returned on {today}, before its checkout on {}",
                self.checkout_date.as_ref()
            )));
        }
        self.substitute(|record| {
            *record.returned_at = Some(ReturnedAt::new(today));
            *record.status = RentalStatus::Returned;
            *record.fee = Some(fee);
        });
        Ok(())
    }
}
