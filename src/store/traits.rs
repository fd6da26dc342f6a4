//! Store backend trait definitions.

/// The interface every store engine implements.
pub mod store_backend;
