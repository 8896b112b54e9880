use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Fee charged per whole day late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct FeeRate(u64);

impl FeeRate {
    pub fn new(per_day: impl Into<u64>) -> Self {
        Self(per_day.into())
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::new(500u64)
    }
}
