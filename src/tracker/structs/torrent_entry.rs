use serde::Serialize;

/// Aggregate counters for a single torrent.
///
/// These are maintained incrementally from announce outcomes rather
/// than recounted from the membership sets, so reads stay O(1).
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TorrentEntry {
    pub seeders: u64,
    pub leechers: u64,
    pub completed: u64,
    pub disabled: bool,
}
