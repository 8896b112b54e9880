mod common;
mod customer;
mod item;
mod policy;
mod rental;
mod snapshot;

pub use self::{common::*, customer::*, item::*, policy::*, rental::*, snapshot::*};
