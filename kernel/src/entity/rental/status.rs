use serde::{Deserialize, Serialize};

/// `Overdue` is never stored on a live record; it is derived from the due date
/// whenever a record is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    Rented,
    Overdue,
    Returned,
}
