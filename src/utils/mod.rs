//! General utility functions shared by the other modules.

/// Seeding credit ("bonus") calculation and rounding helpers.
pub mod bonus;

/// Sentry trace transaction helpers, active when trace logging is enabled.
pub mod sentry_tracing;
