//! Core tracker engine.
//!
//! Implements the announce and scrape request lifecycle on top of the
//! backing store: request validation, swarm membership transitions,
//! aggregate counter maintenance, per-user transfer accounting and
//! peer list assembly.
//!
//! # Request Lifecycle
//!
//! 1. Query string is parsed and validated into a typed request
//! 2. The passkey (when present) is resolved to a user account
//! 3. The peer record is upserted atomically in the store
//! 4. Swarm membership and aggregate counters are updated from the
//!    upsert outcome
//! 5. A peer list is assembled, seeders first for leechers
//!
//! # Consistency
//!
//! Counter updates are gated on the success of the corresponding set
//! operation, so concurrent announces for the same peer never double
//! count. A counter that would go negative is clamped to zero and
//! reported as an internal inconsistency.

/// Tracker enumerations (announce events, swarm classes).
pub mod enums;

/// Tracker error taxonomy mapped to HTTP status codes.
pub mod errors;

/// Implementation blocks for tracker types and handlers.
pub mod impls;

/// Tracker data structures.
pub mod structs;
