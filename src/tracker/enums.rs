//! Tracker enumerations.

/// BitTorrent announce event types.
pub mod announce_event;

/// Seeder or leecher classification of a peer within a swarm.
pub mod swarm_class;
