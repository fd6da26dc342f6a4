//! Shared helper functions used across the tracker modules.
//!
//! Query string parsing (binary safe, required for raw `info_hash` bytes),
//! hex conversion, logging setup and timestamp helpers.

/// Common data structures.
pub mod structs;

/// Core utility functions.
#[allow(clippy::module_inception)]
pub mod common;

/// Implementation blocks for common types.
pub mod impls;
