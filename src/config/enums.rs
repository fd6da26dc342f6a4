//! Configuration enumerations.

/// Errors raised while loading or parsing the configuration file.
pub mod configuration_error;

/// Torrent registration policy (open or closed tracker).
pub mod registration_policy;
