use std::sync::Arc;
use log::info;
use parking_lot::RwLock;
use crate::config::structs::config_watcher::ConfigWatcher;
use crate::geo::structs::geo_db::GeoDb;
use crate::geo::structs::geo_db::GeoLocation;
use crate::stats::structs::stats_atomics::StatsAtomics;
use crate::store::structs::store_connector::StoreConnector;
use crate::tracker::structs::torrent_tracker::TorrentTracker;

impl TorrentTracker {
    pub fn new(config: Arc<ConfigWatcher>, store: StoreConnector) -> TorrentTracker {
        TorrentTracker {
            config,
            store,
            stats: Arc::new(StatsAtomics::new()),
            geo: RwLock::new(None),
        }
    }

    /// Swaps in a freshly loaded geo dataset. In-flight requests keep
    /// the snapshot they already took.
    pub fn set_geo(&self, geo: GeoDb) {
        info!("[Geo] dataset active with {} ranges", geo.len());
        *self.geo.write() = Some(Arc::new(geo));
    }

    pub fn geo_snapshot(&self) -> Option<Arc<GeoDb>> {
        self.geo.read().clone()
    }

    /// Best-effort location of an address, `None` when no dataset is
    /// loaded or the address is outside every range.
    pub fn locate(&self, ip: std::net::IpAddr) -> Option<GeoLocation> {
        self.geo_snapshot().and_then(|db| db.lookup(ip))
    }
}
