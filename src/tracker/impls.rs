//! Implementation blocks for tracker types and handlers.

pub mod info_hash;
pub mod peer_id;
pub mod user_id;
pub mod torrent_tracker;
pub mod torrent_tracker_handlers;
pub mod torrent_tracker_swarms;
pub mod torrent_tracker_torrents;
pub mod torrent_tracker_users;
pub mod torrent_tracker_expiry;
