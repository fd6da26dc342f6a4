use std::sync::Arc;
use parking_lot::RwLock;
use crate::config::structs::config_watcher::ConfigWatcher;
use crate::geo::structs::geo_db::GeoDb;
use crate::stats::structs::stats_atomics::StatsAtomics;
use crate::store::structs::store_connector::StoreConnector;

/// The tracker engine.
///
/// Holds no swarm state of its own: all torrent, peer and user data
/// lives in the backing store, so any number of tracker processes can
/// serve the same swarms. Constructed once at startup and shared as an
/// `Arc` across HTTP workers and background tasks.
pub struct TorrentTracker {
    pub config: Arc<ConfigWatcher>,
    pub store: StoreConnector,
    pub stats: Arc<StatsAtomics>,
    pub geo: RwLock<Option<Arc<GeoDb>>>,
}
