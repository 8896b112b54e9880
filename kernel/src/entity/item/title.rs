use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ItemTitle(String);

impl ItemTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }
}
