//! Configuration management module.
//!
//! Handles loading, parsing and validating the tracker configuration from
//! `config.toml`, and holds the live configuration behind an atomically
//! swappable handle so a reload signal never exposes a half-updated
//! configuration to in-flight requests.
//!
//! # Configuration Structure
//!
//! - **tracker_config**: announce intervals, peer TTL, numwant cap,
//!   registration policy and credit settings
//! - **store**: backing store engine (redis or memory), address, prefix
//! - **http_server**: one or more HTTP/HTTPS listener instances
//! - **geo**: optional local IP range dataset for peer list ordering
//! - **sentry_config**: error reporting

/// Configuration enumerations (registration policy, error kinds).
pub mod enums;

/// Configuration data structures.
pub mod structs;

/// Implementation blocks for configuration loading/saving/reloading.
pub mod impls;
