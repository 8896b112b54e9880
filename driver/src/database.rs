pub use self::{json::*, memory::*};

mod json;
mod memory;
