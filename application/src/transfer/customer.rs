use kernel::prelude::entity::{Customer, DestructCustomer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub active_rentals: u32,
}

impl From<Customer> for CustomerDto {
    fn from(value: Customer) -> Self {
        let DestructCustomer {
            id,
            name,
            active_rentals,
        } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            active_rentals: active_rentals.into(),
        }
    }
}

pub struct CreateCustomerDto {
    pub id: String,
    pub name: String,
}

pub struct GetCustomerDto {
    pub id: String,
}
