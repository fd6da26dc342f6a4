//! Tracker data structures.

/// A 20-byte BitTorrent info hash.
pub mod info_hash;

/// A 20-byte BitTorrent peer identifier.
pub mod peer_id;

/// A 20-byte user identifier derived from a passkey.
pub mod user_id;

/// Aggregate per-torrent counters.
pub mod torrent_entry;

/// A peer record as stored in the backing store.
pub mod torrent_peer;

/// Outcome of the atomic peer upsert.
pub mod peer_upsert;

/// Per-user transfer totals and credit.
pub mod user_entry_item;

/// Parsed announce request parameters.
pub mod announce_query_request;

/// Parsed scrape request parameters.
pub mod scrape_query_request;

/// The tracker engine holding config, store, stats and geo handles.
pub mod torrent_tracker;
