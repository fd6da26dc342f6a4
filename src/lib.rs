//! # RedisTracker
//!
//! A private BitTorrent tracker built with Rust and the Actix-web framework,
//! keeping all swarm state in Redis.
//!
//! ## Overview
//!
//! RedisTracker serves HTTP/HTTPS announce and scrape requests while the
//! authoritative swarm state (torrent counters, swarm membership sets and
//! per-peer session records) lives in Redis. Peer records carry a TTL, and
//! Redis keyspace expiration events drive a reconciliation task that keeps
//! counters accurate when peers vanish without a `stopped` announce. An
//! in-process memory engine implements the same store contract for testing
//! and single-node deployments.
//!
//! ## Features
//!
//! - **HTTP/HTTPS Tracker**: Multiple concurrent listeners with optional TLS
//! - **Redis State**: Atomic announce upserts via a server-side Lua script
//! - **Peer Expiry**: TTL-backed peer records reconciled through keyspace
//!   notifications
//! - **User Accounts**: Optional passkey authentication with per-user
//!   transfer totals and seeding bonus credit
//! - **Geo Matching**: Peer lists ordered by geographic proximity from a
//!   CSV range dataset
//! - **Hot Reload**: Configuration and geo dataset reload on `SIGUSR2`
//! - **Monitoring**: Real-time statistics and Sentry integration
//!
//! ## BEP Compliance
//!
//! This tracker implements the following BitTorrent Enhancement Proposals:
//! - BEP 3: The BitTorrent Protocol Specification
//! - BEP 7: IPv6 Tracker Extension
//! - BEP 23: Tracker Returns Compact Peer Lists
//! - BEP 48: Tracker Protocol Extension: Scrape
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use redistracker::config::structs::config_watcher::ConfigWatcher;
//! use redistracker::config::structs::configuration::Configuration;
//! use redistracker::store::structs::store_connector::StoreConnector;
//! use redistracker::tracker::structs::torrent_tracker::TorrentTracker;
//!
//! // Load configuration from file
//! let config = Configuration::load_from_file("config.toml", false)?;
//!
//! // Connect the store backend and create the tracker instance
//! let store = StoreConnector::new(&config.store).await?;
//! let tracker = Arc::new(TorrentTracker::new(Arc::new(ConfigWatcher::new(config)), store));
//! ```

/// Common utilities and shared functionality.
///
/// Contains helper functions for query parsing, hex conversion,
/// logging setup, and error handling used across all modules.
pub mod common;

/// Configuration management module.
///
/// Handles loading, parsing, and validating configuration from TOML files,
/// and holds the swappable snapshot used for hot reload.
pub mod config;

/// Geographic IP matching module.
///
/// Loads a CSV dataset of IP ranges with coordinates and resolves peer
/// addresses to locations for proximity-ordered peer lists.
pub mod geo;

/// HTTP/HTTPS tracker protocol implementation.
///
/// Handles announce and scrape requests over HTTP/HTTPS according to the
/// BitTorrent tracker protocol specification. Supports multiple concurrent
/// server instances with configurable SSL/TLS.
pub mod http;

/// Statistics tracking and monitoring module.
///
/// Collects real-time metrics on tracker activity including announce and
/// scrape requests, expired peers, and detected counter inconsistencies.
pub mod stats;

/// Swarm state storage module.
///
/// Defines the store contract and its Redis and in-process memory engines,
/// including the atomic peer upsert and the expiration feed.
pub mod store;

/// CLI argument parsing and common data structures.
///
/// Defines command-line interface options for the tracker binary including
/// configuration generation.
pub mod structs;

/// Core tracker logic module.
///
/// Contains the main tracker implementation including peer membership,
/// torrent counters, user accounts, bonus credit settlement, and the
/// announce/scrape request handling logic.
pub mod tracker;

/// Small shared helpers.
///
/// Seeding bonus arithmetic and Sentry tracing shims.
pub mod utils;
