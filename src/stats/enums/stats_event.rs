use serde::{Deserialize, Serialize};

/// Enumeration of all trackable statistics events.
///
/// Each variant represents a counter that can be adjusted through
/// `TorrentTracker::update_stats()` or pinned with `set_stats()`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum StatsEvent {
    Torrents,
    TimestampConsole,
    Tcp4ConnectionsHandled,
    Tcp4AnnouncesHandled,
    Tcp4ScrapesHandled,
    Tcp4NotFound,
    Tcp4Failure,
    Tcp6ConnectionsHandled,
    Tcp6AnnouncesHandled,
    Tcp6ScrapesHandled,
    Tcp6NotFound,
    Tcp6Failure,
    PeersExpired,
    Inconsistencies,
}
