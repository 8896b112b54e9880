use serde::{Deserialize, Serialize};

use kernel::prelude::entity::{ActiveRentals, Customer, CustomerId, CustomerName};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::database) struct CustomerDocument {
    id: String,
    name: String,
    active_count: u32,
}

impl From<&Customer> for CustomerDocument {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id().as_ref().clone(),
            name: customer.name().as_ref().clone(),
            active_count: *customer.active_rentals().as_ref(),
        }
    }
}

impl From<CustomerDocument> for Customer {
    fn from(document: CustomerDocument) -> Self {
        Customer::new(
            CustomerId::new(document.id),
            CustomerName::new(document.name),
            ActiveRentals::new(document.active_count),
        )
    }
}
