use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Maximum number of concurrent rentals per customer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct RentLimit(u32);

impl RentLimit {
    pub fn new(limit: impl Into<u32>) -> Self {
        Self(limit.into())
    }
}

impl Default for RentLimit {
    fn default() -> Self {
        Self::new(5u32)
    }
}
