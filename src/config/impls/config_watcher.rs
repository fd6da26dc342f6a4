use std::sync::Arc;
use parking_lot::RwLock;
use crate::config::structs::config_watcher::ConfigWatcher;
use crate::config::structs::configuration::Configuration;

impl ConfigWatcher {
    pub fn new(config: Configuration) -> ConfigWatcher {
        ConfigWatcher {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Returns the current configuration snapshot. In-flight requests keep
    /// their snapshot even when a reload swaps in a newer one.
    pub fn load(&self) -> Arc<Configuration> {
        self.current.read().clone()
    }

    /// Replaces the live configuration in one step.
    pub fn swap(&self, config: Configuration) {
        *self.current.write() = Arc::new(config);
    }
}
