use serde::{Deserialize, Serialize};
use crate::config::enums::registration_policy::RegistrationPolicy;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackerConfig {
    pub announce_interval: u64,
    pub announce_interval_minimum: u64,
    pub peers_returned: u64,
    pub peer_ttl: u64,
    pub registration_policy: RegistrationPolicy,
    pub allow_anonymous_announces: bool,
    pub credit_multiplier: f64,
    pub credit_whole_session: bool,
}
