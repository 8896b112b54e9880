use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Position of a copy inside its item, starting at zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Fromln, AsRefln, Serialize, Deserialize,
)]
pub struct CopyIndex(usize);

impl CopyIndex {
    pub fn new(index: impl Into<usize>) -> Self {
        Self(index.into())
    }
}

impl std::fmt::Display for CopyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    #[default]
    Available,
    Rented,
}
