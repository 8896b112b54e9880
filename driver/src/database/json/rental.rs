use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use kernel::prelude::entity::{
    CheckoutDate, CopyIndex, CustomerId, DueDate, Fee, ItemId, RentalId, RentalRecord,
    RentalStatus, ReturnedAt,
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::database) struct RentalDocument {
    rental_id: Uuid,
    customer_id: String,
    item_id: String,
    copy_index: usize,
    #[serde(with = "iso_date")]
    checkout_date: Date,
    #[serde(with = "iso_date")]
    due_date: Date,
    #[serde(with = "iso_date::option", default)]
    return_date: Option<Date>,
    status: RentalStatus,
    #[serde(default)]
    fee_charged: Option<u64>,
}

impl RentalDocument {
    /// Unreturned records carry their effective status as of `as_of`.
    pub(in crate::database) fn new(rental: &RentalRecord, as_of: &Date) -> Self {
        Self {
            rental_id: *rental.id().as_ref(),
            customer_id: rental.customer_id().as_ref().clone(),
            item_id: rental.item_id().as_ref().clone(),
            copy_index: *rental.copy_index().as_ref(),
            checkout_date: *rental.checkout_date().as_ref(),
            due_date: *rental.due_date().as_ref(),
            return_date: rental.returned_at().as_ref().map(|returned| *returned.as_ref()),
            status: rental.effective_status(as_of),
            fee_charged: rental.fee().as_ref().map(|fee| *fee.as_ref()),
        }
    }
}

impl From<RentalDocument> for RentalRecord {
    fn from(document: RentalDocument) -> Self {
        // OVERDUE is recomputed on read.
        let status = match document.status {
            RentalStatus::Returned => RentalStatus::Returned,
            RentalStatus::Rented | RentalStatus::Overdue => RentalStatus::Rented,
        };
        RentalRecord::new(
            RentalId::new(document.rental_id),
            CustomerId::new(document.customer_id),
            ItemId::new(document.item_id),
            CopyIndex::new(document.copy_index),
            CheckoutDate::new(document.checkout_date),
            DueDate::new(document.due_date),
            document.return_date.map(ReturnedAt::new),
            status,
            document.fee_charged.map(Fee::new),
        )
    }
}
