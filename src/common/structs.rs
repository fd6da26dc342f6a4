//! Common data structures shared across modules.

/// Simple message-carrying error used during startup.
pub mod custom_error;
