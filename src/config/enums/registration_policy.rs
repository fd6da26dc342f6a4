use serde::{Deserialize, Serialize};

/// Whether unknown info-hashes are auto-registered on first announce.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Unknown torrents are created on first announce.
    Open,
    /// Unknown torrents are rejected.
    Closed,
}
