use std::sync::Arc;
use log::{debug, error, info};
use crate::stats::enums::stats_event::StatsEvent;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::errors::TrackerError;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::torrent_tracker::TorrentTracker;

impl TorrentTracker {
    /// Starts the background task that repairs swarm state when peer
    /// records expire without a `stopped` announce. This reconciliation
    /// path is what keeps counters accurate for peers that just vanish.
    ///
    /// Returns whether a task was started; the feed can only be taken
    /// once per store.
    pub async fn spawn_expiry_reconciler(self: &Arc<Self>) -> Result<bool, TrackerError> {
        let Some(mut feed) = self.store.start_expiration_feed().await? else {
            return Ok(false);
        };
        let tracker = self.clone();
        tokio::spawn(async move {
            info!("[Expiry] reconciliation task started");
            while let Some((info_hash, peer_id)) = feed.recv().await {
                if let Err(e) = tracker.reconcile_expired(&info_hash, &peer_id).await {
                    error!("[Expiry] could not reconcile {} on {}: {}", peer_id, info_hash, e);
                }
            }
            info!("[Expiry] reconciliation task stopped");
        });
        Ok(true)
    }

    /// Handles one expired peer record: remove the stale membership
    /// entry and decrement whichever counter it was held under.
    pub async fn reconcile_expired(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<(), TrackerError> {
        debug!("[Expiry] peer {} on {} timed out", peer_id, info_hash);
        self.update_stats(StatsEvent::PeersExpired, 1);
        self.detach_peer(info_hash, peer_id).await
    }
}
