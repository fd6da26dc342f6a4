use log::{debug, error};
use crate::stats::enums::stats_event::StatsEvent;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::errors::TrackerError;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_tracker::TorrentTracker;

impl TorrentTracker {
    pub async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<TorrentEntry>, TrackerError> {
        Ok(self.store.get_torrent(info_hash).await?)
    }

    /// Registers a torrent when absent. Returns whether it was created.
    pub async fn add_torrent(&self, info_hash: &InfoHash) -> Result<bool, TrackerError> {
        let created = self.store.register_torrent(info_hash).await?;
        if created {
            self.update_stats(StatsEvent::Torrents, 1);
            debug!("[Torrents] registered {}", info_hash);
        }
        Ok(created)
    }

    pub async fn set_torrent_disabled(&self, info_hash: &InfoHash, disabled: bool) -> Result<(), TrackerError> {
        Ok(self.store.set_torrent_disabled(info_hash, disabled).await?)
    }

    pub async fn remove_torrent(&self, info_hash: &InfoHash) -> Result<(), TrackerError> {
        self.store.remove_torrent(info_hash).await?;
        self.update_stats(StatsEvent::Torrents, -1);
        Ok(())
    }

    /// Adjusts an aggregate counter. A result below zero means swarm
    /// state diverged from the membership sets; the counter is clamped
    /// back to zero and the violation is surfaced instead of being
    /// carried forward.
    pub async fn adjust_counter(&self, info_hash: &InfoHash, field: &str, delta: i64) -> Result<(), TrackerError> {
        let value = self.store.torrent_incr(info_hash, field, delta).await?;
        if value < 0 {
            self.update_stats(StatsEvent::Inconsistencies, 1);
            self.store.torrent_set_counter(info_hash, field, 0).await?;
            let message = format!("counter {} on {} went negative ({})", field, info_hash, value);
            error!("[Torrents] {}", message);
            sentry::capture_message(&message, sentry::Level::Error);
            return Err(TrackerError::InternalInconsistency(message));
        }
        Ok(())
    }
}
