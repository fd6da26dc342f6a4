use std::collections::HashMap;
use std::future::Future;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use redis::Script;
use tokio::sync::mpsc::UnboundedReceiver;
use crate::store::errors::StoreError;
use crate::store::structs::redis_store::RedisStore;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::enums::swarm_class::SwarmClass;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::peer_upsert::PeerUpsert;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::user_entry_item::UserEntryItem;
use crate::tracker::structs::user_id::UserId;

/// Merges an announce into the prior peer record in one server-side
/// step. Decides session continuity, transfer deltas and the
/// leech-to-seed completion transition against the prior record, writes
/// the merged record and refreshes its TTL.
///
/// KEYS[1] = peer record key
/// ARGV    = ip, port, user, uploaded, downloaded, left, now, ttl
///
/// Returns {existed, new_session, delta_up, delta_down, session_start,
/// completed_now, was_seeding}.
static UPSERT_PEER_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local raw = redis.call('HGETALL', KEYS[1])
local prior = {}
for i = 1, #raw, 2 do prior[raw[i]] = raw[i + 1] end
local uploaded = tonumber(ARGV[4])
local downloaded = tonumber(ARGV[5])
local left = tonumber(ARGV[6])
local now = tonumber(ARGV[7])
local existed = 0
local new_session = 1
local delta_up = uploaded
local delta_down = downloaded
local session_start = now
local completed_now = 0
local was_seeding = 0
local completed = 0
if prior['ip'] then
    existed = 1
    was_seeding = tonumber(prior['seeding'])
    local prior_up = tonumber(prior['uploaded'])
    local prior_down = tonumber(prior['downloaded'])
    if uploaded >= prior_up and downloaded >= prior_down then
        new_session = 0
        delta_up = uploaded - prior_up
        delta_down = downloaded - prior_down
        session_start = tonumber(prior['session_start'])
        completed = tonumber(prior['completed'])
        if tonumber(prior['left']) > 0 and left == 0 and completed == 0 then
            completed_now = 1
            completed = 1
        end
    end
end
local seeding = 0
if left == 0 then seeding = 1 end
redis.call('HSET', KEYS[1],
    'ip', ARGV[1], 'port', ARGV[2], 'user', ARGV[3],
    'uploaded', ARGV[4], 'downloaded', ARGV[5], 'left', ARGV[6],
    'seeding', seeding, 'completed', completed,
    'session_start', session_start, 'last_announce', now)
redis.call('EXPIRE', KEYS[1], tonumber(ARGV[8]))
return {existed, new_session, delta_up, delta_down, session_start, completed_now, was_seeding}
"#,
    )
});

impl RedisStore {
    #[tracing::instrument(level = "debug", skip(url))]
    pub async fn connect(url: &str, prefix: &str, database: u8, timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::ConnectionError(format!("Failed to create Redis client: {}", e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;
        let store = Self {
            client,
            connection,
            prefix: prefix.to_string(),
            database,
            timeout,
        };
        store.enable_keyspace_notifications().await;
        Ok(store)
    }

    /// Peer record expiry is observed through keyspace notifications,
    /// which need `notify-keyspace-events "KEx"` on the server. Try to
    /// set it ourselves; on managed instances CONFIG is often blocked,
    /// in which case the operator has to set it in redis.conf.
    async fn enable_keyspace_notifications(&self) {
        let mut conn = self.connection.clone();
        let result = redis::cmd("CONFIG")
            .arg("SET")
            .arg("notify-keyspace-events")
            .arg("KEx")
            .query_async::<String>(&mut conn)
            .await;
        if let Err(e) = result {
            warn!("[Redis] could not enable keyspace notifications, set notify-keyspace-events \"KEx\" in redis.conf: {}", e);
        }
    }

    async fn run<T, F>(&self, future: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, redis::RedisError>> + Send,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result.map_err(StoreError::RedisError),
            Err(_) => Err(StoreError::Timeout(self.timeout.as_secs())),
        }
    }

    fn torrent_key(&self, info_hash: &InfoHash) -> String {
        format!("{}t:{}", self.prefix, info_hash)
    }

    fn swarm_key(&self, info_hash: &InfoHash, class: SwarmClass) -> String {
        format!("{}t:{}:{}", self.prefix, info_hash, class.key_suffix())
    }

    fn peer_key(&self, info_hash: &InfoHash, peer_id: &PeerId) -> String {
        format!("{}p:{}:{}", self.prefix, info_hash, peer_id)
    }

    fn user_key(&self, user_id: &UserId) -> String {
        format!("{}u:{}", self.prefix, user_id)
    }

    fn parse_torrent(map: &HashMap<String, String>) -> TorrentEntry {
        let counter = |field: &str| -> u64 {
            map.get(field)
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0)
                .max(0) as u64
        };
        TorrentEntry {
            seeders: counter("seeders"),
            leechers: counter("leechers"),
            completed: counter("completed"),
            disabled: map.get("disabled").map(|v| v == "1").unwrap_or(false),
        }
    }

    fn parse_peer(map: &HashMap<String, String>) -> Result<TorrentPeer, StoreError> {
        let field = |name: &str| -> Result<&String, StoreError> {
            map.get(name)
                .ok_or_else(|| StoreError::OperationError(format!("peer record missing field {}", name)))
        };
        let number = |name: &str| -> Result<u64, StoreError> {
            field(name)?
                .parse::<u64>()
                .map_err(|_| StoreError::OperationError(format!("peer record field {} not numeric", name)))
        };
        let ip = IpAddr::from_str(field("ip")?)
            .map_err(|_| StoreError::OperationError("peer record has invalid ip".to_string()))?;
        let user_raw = field("user")?;
        let user = if user_raw.is_empty() {
            None
        } else {
            Some(UserId::from_str(user_raw)
                .map_err(|_| StoreError::OperationError("peer record has invalid user id".to_string()))?)
        };
        Ok(TorrentPeer {
            ip,
            port: number("port")? as u16,
            user,
            uploaded: number("uploaded")?,
            downloaded: number("downloaded")?,
            left: number("left")?,
            seeding: number("seeding")? == 1,
            completed: number("completed")? == 1,
            session_start: number("session_start")?,
            last_announce: number("last_announce")?,
        })
    }

    /// Splits `<prefix>p:<info-hash>:<peer-id>` out of an expiry
    /// notification payload.
    fn parse_expired_key(prefix: &str, key: &str) -> Option<(InfoHash, PeerId)> {
        let rest = key.strip_prefix(prefix)?.strip_prefix("p:")?;
        let (info_hash_hex, peer_id_hex) = rest.split_once(':')?;
        let info_hash = InfoHash::from_str(info_hash_hex).ok()?;
        let peer_id = PeerId::from_str(peer_id_hex).ok()?;
        Some((info_hash, peer_id))
    }
}

#[async_trait]
impl StoreBackend for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        self.run(async move {
            redis::cmd("PING").query_async::<String>(&mut conn).await
        }).await?;
        Ok(())
    }

    async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<TorrentEntry>, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.torrent_key(info_hash);
        let map: HashMap<String, String> = self.run(async move {
            redis::cmd("HGETALL").arg(&key).query_async(&mut conn).await
        }).await?;
        if map.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::parse_torrent(&map)))
    }

    async fn register_torrent(&self, info_hash: &InfoHash) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.torrent_key(info_hash);
        let results: Vec<i64> = self.run(async move {
            redis::pipe()
                .cmd("HSETNX").arg(&key).arg("seeders").arg(0)
                .cmd("HSETNX").arg(&key).arg("leechers").arg(0)
                .cmd("HSETNX").arg(&key).arg("completed").arg(0)
                .cmd("HSETNX").arg(&key).arg("disabled").arg(0)
                .query_async(&mut conn)
                .await
        }).await?;
        let created = results.first().copied().unwrap_or(0) == 1;
        if created {
            debug!("[Redis] Registered torrent {}", info_hash);
        }
        Ok(created)
    }

    async fn set_torrent_disabled(&self, info_hash: &InfoHash, disabled: bool) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let key = self.torrent_key(info_hash);
        self.run(async move {
            redis::cmd("HSET")
                .arg(&key)
                .arg("disabled")
                .arg(if disabled { 1 } else { 0 })
                .query_async::<i64>(&mut conn)
                .await
        }).await?;
        Ok(())
    }

    async fn remove_torrent(&self, info_hash: &InfoHash) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let keys = vec![
            self.torrent_key(info_hash),
            self.swarm_key(info_hash, SwarmClass::Seeders),
            self.swarm_key(info_hash, SwarmClass::Leechers),
        ];
        self.run(async move {
            redis::cmd("DEL").arg(&keys).query_async::<i64>(&mut conn).await
        }).await?;
        Ok(())
    }

    async fn torrent_incr(&self, info_hash: &InfoHash, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.torrent_key(info_hash);
        let field = field.to_string();
        self.run(async move {
            redis::cmd("HINCRBY")
                .arg(&key)
                .arg(&field)
                .arg(delta)
                .query_async::<i64>(&mut conn)
                .await
        }).await
    }

    async fn torrent_set_counter(&self, info_hash: &InfoHash, field: &str, value: u64) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let key = self.torrent_key(info_hash);
        let field = field.to_string();
        self.run(async move {
            redis::cmd("HSET")
                .arg(&key)
                .arg(&field)
                .arg(value)
                .query_async::<i64>(&mut conn)
                .await
        }).await?;
        Ok(())
    }

    async fn upsert_peer(
        &self,
        info_hash: &InfoHash,
        peer_id: &PeerId,
        peer: &TorrentPeer,
        ttl: u64,
    ) -> Result<PeerUpsert, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.peer_key(info_hash, peer_id);
        let user = peer.user.map(|u| u.to_string()).unwrap_or_default();
        let ip = peer.ip.to_string();
        let (port, uploaded, downloaded, left, now) =
            (peer.port, peer.uploaded, peer.downloaded, peer.left, peer.last_announce);
        let (existed, new_session, delta_up, delta_down, session_start, completed_now, was_seeding):
            (i64, i64, i64, i64, i64, i64, i64) = self.run(async move {
            UPSERT_PEER_SCRIPT
                .key(&key)
                .arg(&ip)
                .arg(port)
                .arg(&user)
                .arg(uploaded)
                .arg(downloaded)
                .arg(left)
                .arg(now)
                .arg(ttl)
                .invoke_async(&mut conn)
                .await
        }).await?;
        Ok(PeerUpsert {
            existed: existed == 1,
            new_session: new_session == 1,
            delta_uploaded: delta_up.max(0) as u64,
            delta_downloaded: delta_down.max(0) as u64,
            session_start: session_start.max(0) as u64,
            completed_now: completed_now == 1,
            was_seeding: was_seeding == 1,
        })
    }

    async fn get_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.peer_key(info_hash, peer_id);
        let map: HashMap<String, String> = self.run(async move {
            redis::cmd("HGETALL").arg(&key).query_async(&mut conn).await
        }).await?;
        if map.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::parse_peer(&map)?))
    }

    async fn remove_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<Option<TorrentPeer>, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.peer_key(info_hash, peer_id);
        let (map, _deleted): (HashMap<String, String>, i64) = self.run(async move {
            redis::pipe()
                .atomic()
                .cmd("HGETALL").arg(&key)
                .cmd("DEL").arg(&key)
                .query_async(&mut conn)
                .await
        }).await?;
        if map.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::parse_peer(&map)?))
    }

    async fn swarm_add(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.swarm_key(info_hash, class);
        let member = peer_id.to_string();
        let added: i64 = self.run(async move {
            redis::cmd("SADD").arg(&key).arg(&member).query_async(&mut conn).await
        }).await?;
        Ok(added == 1)
    }

    async fn swarm_remove(&self, info_hash: &InfoHash, class: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.swarm_key(info_hash, class);
        let member = peer_id.to_string();
        let removed: i64 = self.run(async move {
            redis::cmd("SREM").arg(&key).arg(&member).query_async(&mut conn).await
        }).await?;
        Ok(removed == 1)
    }

    async fn swarm_move(&self, info_hash: &InfoHash, from: SwarmClass, to: SwarmClass, peer_id: &PeerId) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let from_key = self.swarm_key(info_hash, from);
        let to_key = self.swarm_key(info_hash, to);
        let member = peer_id.to_string();
        let moved: i64 = self.run(async move {
            redis::cmd("SMOVE")
                .arg(&from_key)
                .arg(&to_key)
                .arg(&member)
                .query_async(&mut conn)
                .await
        }).await?;
        Ok(moved == 1)
    }

    async fn swarm_members(&self, info_hash: &InfoHash, class: SwarmClass) -> Result<Vec<PeerId>, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.swarm_key(info_hash, class);
        let members: Vec<String> = self.run(async move {
            redis::cmd("SMEMBERS").arg(&key).query_async(&mut conn).await
        }).await?;
        let mut peers = Vec::with_capacity(members.len());
        for member in members {
            match PeerId::from_str(&member) {
                Ok(peer_id) => peers.push(peer_id),
                Err(_) => error!("[Redis] dropping malformed swarm member {} in {}", member, info_hash),
            }
        }
        Ok(peers)
    }

    async fn swarm_peers(&self, info_hash: &InfoHash, class: SwarmClass, limit: usize) -> Result<Vec<(PeerId, TorrentPeer)>, StoreError> {
        let members = self.swarm_members(info_hash, class).await?;
        if members.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.connection.clone();
        let keys: Vec<String> = members.iter().map(|p| self.peer_key(info_hash, p)).collect();
        let maps: Vec<HashMap<String, String>> = self.run(async move {
            let mut pipe = redis::pipe();
            for key in &keys {
                pipe.cmd("HGETALL").arg(key);
            }
            pipe.query_async(&mut conn).await
        }).await?;
        let mut peers = Vec::with_capacity(limit.min(members.len()));
        for (peer_id, map) in members.into_iter().zip(maps) {
            if map.is_empty() {
                // Record expired but the set was not reconciled yet.
                continue;
            }
            peers.push((peer_id, Self::parse_peer(&map)?));
            if peers.len() >= limit {
                break;
            }
        }
        Ok(peers)
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<UserEntryItem>, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.user_key(user_id);
        let map: HashMap<String, String> = self.run(async move {
            redis::cmd("HGETALL").arg(&key).query_async(&mut conn).await
        }).await?;
        if map.is_empty() {
            return Ok(None);
        }
        let number = |name: &str| -> u64 {
            map.get(name).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0)
        };
        Ok(Some(UserEntryItem {
            uploaded: number("uploaded"),
            downloaded: number("downloaded"),
            completed: number("completed"),
            credit: map.get("credit").and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0),
            active: map.get("active").map(|v| v == "1").unwrap_or(false),
        }))
    }

    async fn put_user(&self, user_id: &UserId, user: &UserEntryItem) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let key = self.user_key(user_id);
        let user = user.clone();
        self.run(async move {
            redis::cmd("HSET")
                .arg(&key)
                .arg("uploaded").arg(user.uploaded)
                .arg("downloaded").arg(user.downloaded)
                .arg("completed").arg(user.completed)
                .arg("credit").arg(user.credit)
                .arg("active").arg(if user.active { 1 } else { 0 })
                .query_async::<i64>(&mut conn)
                .await
        }).await?;
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
        let mut conn = self.connection.clone();
        let key = self.user_key(user_id);
        self.run(async move {
            let mut pipe = redis::pipe();
            pipe.atomic();
            if delta_uploaded > 0 {
                pipe.cmd("HINCRBY").arg(&key).arg("uploaded").arg(delta_uploaded).ignore();
            }
            if delta_downloaded > 0 {
                pipe.cmd("HINCRBY").arg(&key).arg("downloaded").arg(delta_downloaded).ignore();
            }
            if completed {
                pipe.cmd("HINCRBY").arg(&key).arg("completed").arg(1).ignore();
            }
            if credit != 0.0 {
                pipe.cmd("HINCRBYFLOAT").arg(&key).arg("credit").arg(credit).ignore();
            }
            pipe.query_async::<()>(&mut conn).await
        }).await?;
        Ok(())
    }

    async fn start_expiration_feed(&self) -> Result<Option<UnboundedReceiver<(InfoHash, PeerId)>>, StoreError> {
        let mut pubsub = self.client
            .get_async_pubsub()
            .await
            .map_err(|e| StoreError::ConnectionError(format!("Failed to open pubsub connection: {}", e)))?;
        let channel = format!("__keyevent@{}__:expired", self.database);
        pubsub
            .subscribe(&channel)
            .await
            .map_err(|e| StoreError::ConnectionError(format!("Failed to subscribe to {}: {}", channel, e)))?;
        let prefix = self.prefix.clone();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(message) = stream.next().await {
                let key: String = match message.get_payload() {
                    Ok(key) => key,
                    Err(e) => {
                        error!("[Redis] bad expiry notification payload: {}", e);
                        continue;
                    }
                };
                if let Some((info_hash, peer_id)) = Self::parse_expired_key(&prefix, &key)
                    && tx.send((info_hash, peer_id)).is_err() {
                        break;
                    }
            }
            debug!("[Redis] expiry notification stream closed");
        });
        Ok(Some(rx))
    }
}
