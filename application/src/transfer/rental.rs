use std::slice;

use time::Date;
use uuid::Uuid;

use kernel::prelude::entity::{DestructRentalRecord, RentalPolicy, RentalRecord, RentalStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalDto {
    pub id: Uuid,
    pub customer_id: String,
    pub item_id: String,
    pub copy_index: usize,
    pub checkout_date: Date,
    pub due_date: Date,
    pub returned_at: Option<Date>,
    /// Effective status as of the day the record was read.
    pub status: RentalStatus,
    pub fee: Option<u64>,
}

impl RentalDto {
    pub fn new(value: RentalRecord, today: &Date) -> Self {
        let status = value.effective_status(today);
        let DestructRentalRecord {
            id,
            customer_id,
            item_id,
            copy_index,
            checkout_date,
            due_date,
            returned_at,
            status: _,
            fee,
        } = value.into_destruct();
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            item_id: item_id.into(),
            copy_index: copy_index.into(),
            checkout_date: checkout_date.into(),
            due_date: due_date.into(),
            returned_at: returned_at.map(Into::into),
            status,
            fee: fee.map(Into::into),
        }
    }
}

pub struct CheckoutDto {
    pub customer_id: String,
    pub item_id: String,
    pub today: Date,
}

pub struct ReturnDto {
    pub rental_id: Uuid,
    pub today: Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnedDto {
    pub rental: RentalDto,
    pub fee: u64,
}

pub struct GetRentalDto {
    pub id: Uuid,
    pub today: Date,
}

pub struct CustomerRentalsDto {
    pub customer_id: String,
    pub today: Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueRentalDto {
    pub rental: RentalDto,
    pub days_late: i64,
    pub accrued_fee: u64,
}

/// Overdue rentals as of one day.
///
/// Holds the unreturned records read when the query ran; every call to
/// [`OverdueRentals::iter`] starts over and filters them lazily.
#[derive(Debug, Clone)]
pub struct OverdueRentals {
    today: Date,
    policy: RentalPolicy,
    candidates: Vec<RentalRecord>,
}

impl OverdueRentals {
    pub fn new(today: Date, policy: RentalPolicy, candidates: Vec<RentalRecord>) -> Self {
        Self {
            today,
            policy,
            candidates,
        }
    }

    pub fn today(&self) -> &Date {
        &self.today
    }

    pub fn iter(&self) -> OverdueIter<'_> {
        OverdueIter {
            today: &self.today,
            policy: &self.policy,
            inner: self.candidates.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a OverdueRentals {
    type Item = OverdueRentalDto;
    type IntoIter = OverdueIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct OverdueIter<'a> {
    today: &'a Date,
    policy: &'a RentalPolicy,
    inner: slice::Iter<'a, RentalRecord>,
}

impl Iterator for OverdueIter<'_> {
    type Item = OverdueRentalDto;

    fn next(&mut self) -> Option<Self::Item> {
        let today = self.today;
        let rental = self.inner.find(|rental| rental.is_overdue(today))?;
        Some(OverdueRentalDto {
            days_late: rental.days_late(today),
            accrued_fee: self.policy.compute_fee(rental.due_date(), today).into(),
            rental: RentalDto::new(rental.clone(), today),
        })
    }
}
