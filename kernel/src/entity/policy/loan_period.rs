use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Loan length in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct LoanPeriod(u32);

impl LoanPeriod {
    pub fn new(days: impl Into<u32>) -> Self {
        Self(days.into())
    }
}

impl Default for LoanPeriod {
    fn default() -> Self {
        Self::new(14u32)
    }
}
