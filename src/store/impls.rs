//! Implementation blocks for store connectors.

pub mod store_connector;
pub mod redis_store;
pub mod memory_store;
