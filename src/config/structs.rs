//! Configuration data structures, one per TOML section.

/// Root configuration structure containing all settings.
pub mod configuration;

/// Atomically swappable handle around the live configuration.
pub mod config_watcher;

/// Core tracker settings (intervals, peer TTL, credit, policy).
pub mod tracker_config;

/// Backing store configuration (engine, address, prefix, timeout).
pub mod store_config;

/// HTTP/HTTPS server configuration.
pub mod http_trackers_config;

/// Geo dataset configuration.
pub mod geo_config;

/// Sentry error reporting configuration.
pub mod sentry_config;
