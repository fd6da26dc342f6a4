//! Store connector structures.

/// Main store connector providing unified engine access.
pub mod store_connector;

/// Redis-backed store engine.
pub mod redis_store;

/// In-process memory store engine.
pub mod memory_store;
