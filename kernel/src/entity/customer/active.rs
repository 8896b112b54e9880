use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Number of rentals a customer currently holds (RENTED or OVERDUE).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Fromln, AsRefln, Serialize, Deserialize,
)]
pub struct ActiveRentals(u32);

impl ActiveRentals {
    pub fn new(count: impl Into<u32>) -> Self {
        Self(count.into())
    }
}
