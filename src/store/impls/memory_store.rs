use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::UnboundedReceiver;
use crate::store::errors::StoreError;
use crate::store::structs::memory_store::{MemoryPeer, MemoryStore, MemoryStoreInner, MemoryTorrent};
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::enums::swarm_class::SwarmClass;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::peer_upsert::PeerUpsert;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::user_entry_item::UserEntryItem;
use crate::tracker::structs::user_id::UserId;

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        let (expired_tx, expired_rx) = tokio::sync::mpsc::unbounded_channel();
        MemoryStore {
            inner: Arc::new(MemoryStoreInner {
                torrents: RwLock::new(BTreeMap::new()),
                peers: RwLock::new(BTreeMap::new()),
                swarms: RwLock::new(HashMap::new()),
                users: RwLock::new(HashMap::new()),
                expired_tx,
                expired_rx: Mutex::new(Some(expired_rx)),
            }),
        }
    }

    /// Evicts peer records whose expiry timestamp has passed and feeds
    /// them into the reconciliation channel, mirroring what Redis
    /// keyspace notifications deliver. Takes the clock as an argument
    /// so tests can advance time deterministically.
    pub fn sweep_expired(&self, now: u64) -> usize {
        let mut peers = self.inner.peers.write();
        let expired: Vec<(InfoHash, PeerId)> = peers
            .iter()
            .filter(|(_, record)| record.expire_at <= now)
            .map(|(key, _)| *key)
            .collect();
        for key in &expired {
            peers.remove(key);
            // Receiver side may be gone in tests that never start the feed.
            let _ = self.inner.expired_tx.send(*key);
        }
        expired.len()
    }

    fn counter_mut<'a>(torrent: &'a mut MemoryTorrent, field: &str) -> Result<&'a mut i64, StoreError> {
        match field {
            "seeders" => Ok(&mut torrent.seeders),
            "leechers" => Ok(&mut torrent.leechers),
            "completed" => Ok(&mut torrent.completed),
            _ => Err(StoreError::OperationError(format!("unknown counter field {}", field))),
        }
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<TorrentEntry>, StoreError> {
        Ok(self.inner.torrents.read().get(info_hash).map(|t| TorrentEntry {
            seeders: t.seeders.max(0) as u64,
            leechers: t.leechers.max(0) as u64,
            completed: t.completed.max(0) as u64,
            disabled: t.disabled,
        }))
    }

    async fn register_torrent(&self, info_hash: &InfoHash) -> Result<bool, StoreError> {
        let mut torrents = self.inner.torrents.write();
        if torrents.contains_key(info_hash) {
            return Ok(false);
        }
        torrents.insert(*info_hash, MemoryTorrent::default());
        Ok(true)
    }

    async fn set_torrent_disabled(&self, info_hash: &InfoHash, disabled: bool) -> Result<(), StoreError> {
        self.inner.torrents.write().entry(*info_hash).or_default().disabled = disabled;
        Ok(())
    }

    async fn remove_torrent(&self, info_hash: &InfoHash) -> Result<(), StoreError> {
        self.inner.torrents.write().remove(info_hash);
        let mut swarms = self.inner.swarms.write();
        swarms.remove(&(*info_hash, SwarmClass::Seeders));
        swarms.remove(&(*info_hash, SwarmClass::Leechers));
        Ok(())
    }

    async fn torrent_incr(&self, info_hash: &InfoHash, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut torrents = self.inner.torrents.write();
        let torrent = torrents.entry(*info_hash).or_default();
        let counter = Self::counter_mut(torrent, field)?;
        *counter += delta;
        Ok(*counter)
    }

    async fn torrent_set_counter(&self, info_hash: &InfoHash, field: &str, value: u64) -> Result<(), StoreError> {
        let mut torrents = self.inner.torrents.write();
        let torrent = torrents.entry(*info_hash).or_default();
        let counter = Self::counter_mut(torrent, field)?;
        *counter = value as i64;
        Ok(())
    }

    async fn upsert_peer(
        &self,
        info_hash: &InfoHash,
        peer_id: &PeerId,
        peer: &TorrentPeer,
        ttl: u64,
    ) -> Result<PeerUpsert, StoreError> {
        let now = peer.last_announce;
        let mut peers = self.inner.peers.write();
        let prior = peers.get(&(*info_hash, *peer_id)).map(|r| r.peer.clone());

        let mut stored = peer.clone();
        let mut upsert = PeerUpsert {
            existed: prior.is_some(),
            new_session: true,
            delta_uploaded: peer.uploaded,
            delta_downloaded: peer.downloaded,
            session_start: now,
            completed_now: false,
            was_seeding: false,
        };
        if let Some(prior) = prior {
            upsert.was_seeding = prior.seeding;
            if peer.uploaded >= prior.uploaded && peer.downloaded >= prior.downloaded {
                upsert.new_session = false;
                upsert.delta_uploaded = peer.uploaded - prior.uploaded;
                upsert.delta_downloaded = peer.downloaded - prior.downloaded;
                upsert.session_start = prior.session_start;
                stored.completed = prior.completed;
                if prior.left > 0 && peer.left == 0 && !prior.completed {
                    upsert.completed_now = true;
                    stored.completed = true;
                }
            }
        }
        stored.seeding = peer.left == 0;
        stored.session_start = upsert.session_start;
        if upsert.new_session {
            stored.completed = false;
        }
        peers.insert(
            (*info_hash, *peer_id),
            MemoryPeer { peer: stored, expire_at: now + ttl },
        );
        Ok(upsert)
    }

    async fn get_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError> {
        Ok(self.inner.peers.read().get(&(*info_hash, *peer_id)).map(|r| r.peer.clone()))
    }

    async fn remove_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError> {
        Ok(self.inner.peers.write().remove(&(*info_hash, *peer_id)).map(|r| r.peer))
    }

    async fn swarm_add(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        let mut swarms = self.inner.swarms.write();
        Ok(swarms.entry((*info_hash, class)).or_default().insert(*peer_id))
    }

    async fn swarm_remove(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        let mut swarms = self.inner.swarms.write();
        Ok(swarms.get_mut(&(*info_hash, class)).map(|s| s.remove(peer_id)).unwrap_or(false))
    }

    async fn swarm_move(&self, info_hash: &InfoHash, from: SwarmClass, to: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        let mut swarms = self.inner.swarms.write();
        let present = swarms.get_mut(&(*info_hash, from)).map(|s| s.remove(peer_id)).unwrap_or(false);
        if present {
            swarms.entry((*info_hash, to)).or_default().insert(*peer_id);
        }
        Ok(present)
    }

    async fn swarm_members(&self, info_hash: &InfoHash, class: SwarmClass) -> Result<Vec<PeerId>, StoreError> {
        Ok(self.inner.swarms.read()
            .get(&(*info_hash, class))
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn swarm_peers(&self, info_hash: &InfoHash, class: SwarmClass, limit: usize) -> Result<Vec<(PeerId, TorrentPeer)>, StoreError> {
        let members = self.swarm_members(info_hash, class).await?;
        let peers = self.inner.peers.read();
        let mut result = Vec::with_capacity(limit.min(members.len()));
        for peer_id in members {
            if let Some(record) = peers.get(&(*info_hash, peer_id)) {
                result.push((peer_id, record.peer.clone()));
                if result.len() >= limit {
                    break;
                }
            }
        }
        Ok(result)
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserEntryItem>, StoreError> {
        Ok(self.inner.users.read().get(user_id).cloned())
    }

    async fn put_user(&self, user_id: &UserId, user: &UserEntryItem) -> Result<(), StoreError> {
        self.inner.users.write().insert(*user_id, user.clone());
        Ok(())
    }

    async fn user_add_transfer(
        &self,
        user_id: &UserId,
        delta_uploaded: u64,
        delta_downloaded: u64,
        completed: bool,
        credit: f64,
    ) -> Result<(), StoreError> {
        let mut users = self.inner.users.write();
        let user = users.entry(*user_id).or_default();
        user.uploaded += delta_uploaded;
        user.downloaded += delta_downloaded;
        if completed {
            user.completed += 1;
        }
        user.credit += credit;
        Ok(())
    }

    async fn start_expiration_feed(&self) -> Result<Option<UnboundedReceiver<(InfoHash, PeerId)>>, StoreError> {
        Ok(self.inner.expired_rx.lock().take())
    }
}
