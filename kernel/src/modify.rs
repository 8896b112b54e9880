mod customer;
mod item;
mod rental;

pub use self::{customer::*, item::*, rental::*};
