use std::time::Duration;
use async_trait::async_trait;
use log::info;
use tokio::sync::mpsc::UnboundedReceiver;
use crate::config::structs::store_config::StoreConfig;
use crate::store::enums::store_engine::StoreEngine;
use crate::store::errors::StoreError;
use crate::store::structs::memory_store::MemoryStore;
use crate::store::structs::redis_store::RedisStore;
use crate::store::structs::store_connector::StoreConnector;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::enums::swarm_class::SwarmClass;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::peer_upsert::PeerUpsert;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::user_entry_item::UserEntryItem;
use crate::tracker::structs::user_id::UserId;

impl StoreConnector {
    #[tracing::instrument(level = "debug")]
    pub async fn new(config: &StoreConfig) -> Result<StoreConnector, StoreError> {
        let transaction = crate::utils::sentry_tracing::start_trace_transaction("store_init", "store");
        let result: Result<StoreConnector, StoreError> = match config.engine {
            StoreEngine::redis => {
                let auth = if config.password.is_empty() {
                    String::new()
                } else {
                    format!(":{}@", config.password)
                };
                let connection_url = format!(
                    "{}{}{}/{}",
                    config.engine.url_scheme(),
                    auth,
                    config.address,
                    config.database
                );
                let redis_store = RedisStore::connect(
                    &connection_url,
                    &config.prefix,
                    config.database,
                    Duration::from_secs(config.request_timeout),
                ).await?;
                info!("[Store] Connected to Redis at {}", config.address);
                Ok(StoreConnector {
                    redis: Some(redis_store),
                    memory: None,
                    engine: StoreEngine::redis,
                })
            }
            StoreEngine::memory => {
                info!("[Store] Using in-process memory engine");
                Ok(StoreConnector {
                    redis: None,
                    memory: Some(MemoryStore::new()),
                    engine: StoreEngine::memory,
                })
            }
        };
        if let Some(txn) = transaction {
            match &result {
                Ok(_) => txn.set_tag("result", "success"),
                Err(e) => txn.set_tag("result", format!("error: {:?}", e)),
            }
            txn.set_tag("engine", config.engine.to_string());
            txn.set_tag("address", config.address.clone());
            txn.finish();
        }
        result
    }

    fn backend(&self) -> Result<&dyn StoreBackend, StoreError> {
        match self.engine {
            StoreEngine::redis => self.redis.as_ref().map(|r| r as &dyn StoreBackend),
            StoreEngine::memory => self.memory.as_ref().map(|m| m as &dyn StoreBackend),
        }
        .ok_or_else(|| StoreError::ConnectionError(format!("{} engine not connected", self.engine)))
    }

    /// Direct handle to the memory engine, for deterministic expiry
    /// sweeps in tests and single-instance deployments.
    pub fn memory(&self) -> Option<&MemoryStore> {
        self.memory.as_ref()
    }
}

#[async_trait]
impl StoreBackend for StoreConnector {
    async fn ping(&self) -> Result<(), StoreError> {
        self.backend()?.ping().await
    }

    async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<TorrentEntry>, StoreError> {
        self.backend()?.get_torrent(info_hash).await
    }

    async fn register_torrent(&self, info_hash: &InfoHash) -> Result<bool, StoreError> {
        self.backend()?.register_torrent(info_hash).await
    }

    async fn set_torrent_disabled(&self, info_hash: &InfoHash, disabled: bool) -> Result<(), StoreError> {
        self.backend()?.set_torrent_disabled(info_hash, disabled).await
    }

    async fn remove_torrent(&self, info_hash: &InfoHash) -> Result<(), StoreError> {
        self.backend()?.remove_torrent(info_hash).await
    }

    async fn torrent_incr(&self, info_hash: &InfoHash, field: &str, delta: i64) -> Result<i64, StoreError> {
        self.backend()?.torrent_incr(info_hash, field, delta).await
    }

    async fn torrent_set_counter(&self, info_hash: &InfoHash, field: &str, value: u64) -> Result<(), StoreError> {
        self.backend()?.torrent_set_counter(info_hash, field, value).await
    }

    async fn upsert_peer(
        &self,
        info_hash: &InfoHash,
        peer_id: &PeerId,
        peer: &TorrentPeer,
        ttl: u64,
    ) -> Result<PeerUpsert, StoreError> {
        self.backend()?.upsert_peer(info_hash, peer_id, peer, ttl).await
    }

    async fn get_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError> {
        self.backend()?.get_peer(info_hash, peer_id).await
    }

    async fn remove_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError> {
        self.backend()?.remove_peer(info_hash, peer_id).await
    }

    async fn swarm_add(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        self.backend()?.swarm_add(info_hash, class, peer_id).await
    }

    async fn swarm_remove(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        self.backend()?.swarm_remove(info_hash, class, peer_id).await
    }

    async fn swarm_move(&self, info_hash: &InfoHash, from: SwarmClass, to: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        self.backend()?.swarm_move(info_hash, from, to, peer_id).await
    }

    async fn swarm_members(&self, info_hash: &InfoHash, class: SwarmClass) -> Result<Vec<PeerId>, StoreError> {
        self.backend()?.swarm_members(info_hash, class).await
    }

    async fn swarm_peers(&self, info_hash: &InfoHash, class: SwarmClass, limit: usize) -> Result<Vec<(PeerId, TorrentPeer)>, StoreError> {
        self.backend()?.swarm_peers(info_hash, class, limit).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserEntryItem>, StoreError> {
        self.backend()?.get_user(user_id).await
    }

    async fn put_user(&self, user_id: &UserId, user: &UserEntryItem) -> Result<(), StoreError> {
        self.backend()?.put_user(user_id, user).await
    }

    async fn user_add_transfer(
        &self,
        user_id: &UserId,
        delta_uploaded: u64,
        delta_downloaded: u64,
        completed: bool,
        credit: f64,
    ) -> Result<(), StoreError> {
        self.backend()?.user_add_transfer(user_id, delta_uploaded, delta_downloaded, completed, credit).await
    }

    async fn start_expiration_feed(&self) -> Result<Option<UnboundedReceiver<(InfoHash, PeerId)>>, StoreError> {
        self.backend()?.start_expiration_feed().await
    }
}
