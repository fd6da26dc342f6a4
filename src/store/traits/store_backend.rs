use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use crate::store::errors::StoreError;
use crate::tracker::enums::swarm_class::SwarmClass;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::peer_upsert::PeerUpsert;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::user_entry_item::UserEntryItem;
use crate::tracker::structs::user_id::UserId;

#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<TorrentEntry>, StoreError>;

    /// Creates the torrent entry when absent. Returns whether it was created.
    async fn register_torrent(&self, info_hash: &InfoHash) -> Result<bool, StoreError>;

    async fn set_torrent_disabled(&self, info_hash: &InfoHash, disabled: bool) -> Result<(), StoreError>;

    async fn remove_torrent(&self, info_hash: &InfoHash) -> Result<(), StoreError>;

    /// Adds `delta` to an aggregate counter field, returning the new value.
    /// The result can go negative under inconsistency; callers clamp.
    async fn torrent_incr(&self, info_hash: &InfoHash, field: &str, delta: i64) -> Result<i64, StoreError>;

    async fn torrent_set_counter(&self, info_hash: &InfoHash, field: &str, value: u64) -> Result<(), StoreError>;

    /// Atomically merges `peer` with the prior record under this key and
    /// refreshes the record TTL. Session continuity, transfer deltas and
    /// the completion transition are all decided inside the store in one
    /// step, so concurrent announces for the same peer never both claim
    /// the same delta.
    async fn upsert_peer(
        &self,
        info_hash: &InfoHash,
        peer_id: &PeerId,
        peer: &TorrentPeer,
        ttl: u64,
    ) -> Result<PeerUpsert, StoreError>;

    async fn get_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError>;

    /// Deletes the peer record, returning the prior record when present.
    async fn remove_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError>;

    /// Adds a peer to a membership set. Returns whether it was newly added.
    async fn swarm_add(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError>;

    /// Removes a peer from a membership set. Returns whether it was present.
    async fn swarm_remove(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError>;

    /// Moves a peer between membership sets. Returns whether the peer was
    /// present in the source set and therefore moved.
    async fn swarm_move(&self, info_hash: &InfoHash, from: SwarmClass, to: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError>;

    async fn swarm_members(&self, info_hash: &InfoHash, class: SwarmClass) -> Result<Vec<PeerId>, StoreError>;

    /// Fetches up to `limit` live peer records from a membership set.
    /// Members whose record has already expired are skipped.
    async fn swarm_peers(&self, info_hash: &InfoHash, class: SwarmClass, limit: usize) -> Result<Vec<(PeerId, TorrentPeer)>, StoreError>;

    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserEntryItem>, StoreError>;

    async fn put_user(&self, user_id: &UserId, user: &UserEntryItem) -> Result<(), StoreError>;

    /// Accumulates session deltas onto the user account counters.
    async fn user_add_transfer(
        &self,
        user_id: &UserId,
        delta_uploaded: u64,
        delta_downloaded: u64,
        completed: bool,
        credit: f64,
    ) -> Result<(), StoreError>;

    /// Starts the expired-peer feed and hands back its receiver. Returns
    /// `None` when the feed was already taken. Each item names a peer
    /// record that expired without a `stopped` announce.
    async fn start_expiration_feed(&self) -> Result<Option<UnboundedReceiver<(InfoHash, PeerId)>>, StoreError>;
}
