//! Implementation blocks for configuration loading, saving and reloading.

pub mod configuration;
pub mod configuration_error;
pub mod config_watcher;
