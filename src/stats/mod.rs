//! Real-time statistics tracking.
//!
//! Atomic counters for tracker activity, kept per process and printed
//! to the console on an interval. Swarm truth lives in the backing
//! store; these counters only describe what this instance handled.
//!
//! # Thread Safety
//!
//! All statistics are stored as atomic integers, allowing safe
//! concurrent updates from multiple worker threads without locking.

/// Statistics event enumeration.
pub mod enums;

/// Implementation blocks for statistics operations.
pub mod impls;

/// Statistics data structures (atomic counters and snapshots).
pub mod structs;
