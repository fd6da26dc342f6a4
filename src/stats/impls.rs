//! Implementation blocks for statistics operations.

pub mod torrent_tracker;
