use serde::{Deserialize, Serialize};

/// Per-user transfer totals and bonus credit.
///
/// Totals are session-delta accumulations across all of the user's
/// peers. `credit` is stored rounded to two decimal places.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserEntryItem {
    pub uploaded: u64,
    pub downloaded: u64,
    pub completed: u64,
    pub credit: f64,
    pub active: bool,
}
