//! Backing store layer supporting Redis and an in-process memory engine.
//!
//! All swarm state lives here: per-torrent aggregate counters, swarm
//! membership sets, peer records with a TTL, and per-user transfer
//! totals. The tracker process itself holds no swarm state, so several
//! tracker instances can serve the same swarms through a shared Redis.
//!
//! # Supported Engines
//!
//! - **Redis**: production engine, shared across tracker instances
//! - **Memory**: single-process engine for tests and small deployments
//!
//! # Architecture
//!
//! The store uses a trait-based design:
//! - `StoreBackend` trait defines the interface
//! - Each engine has its own connector implementation
//! - `StoreConnector` provides unified access
//!
//! # Key Layout (Redis)
//!
//! With the configured prefix (default `tracker_`):
//!
//! - `t:<info-hash>`: hash of aggregate counters and the disabled flag
//! - `t:<info-hash>:seeders` / `:leechers`: sets of peer ids
//! - `p:<info-hash>:<peer-id>`: peer record hash, expires via TTL
//! - `u:<user-id>`: user account hash
//!
//! Peer records carry a TTL so peers that vanish without a `stopped`
//! event age out on their own. Keyspace expiry notifications feed the
//! reconciliation task that repairs membership sets and counters.

/// Store engine enumeration (redis, memory).
pub mod enums;

/// Error types for store operations.
pub mod errors;

/// Implementation blocks for store connectors.
pub mod impls;

/// Data structures for store connections.
pub mod structs;

/// Store backend trait definitions.
pub mod traits;
