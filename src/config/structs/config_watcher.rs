use std::sync::Arc;
use parking_lot::RwLock;
use crate::config::structs::configuration::Configuration;

/// Shared handle to the live configuration.
///
/// Readers take a cheap `Arc` clone of the current snapshot and keep using it
/// for the duration of a request. A reload builds a complete new
/// `Configuration` and swaps it in atomically, so no request ever observes a
/// half-updated configuration.
pub struct ConfigWatcher {
    pub(crate) current: RwLock<Arc<Configuration>>,
}
