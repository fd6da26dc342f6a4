use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use crate::tracker::enums::swarm_class::SwarmClass;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::user_entry_item::UserEntryItem;
use crate::tracker::structs::user_id::UserId;

/// Aggregate counters as kept internally, signed so that an
/// inconsistency shows up as a negative value instead of wrapping.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MemoryTorrent {
    pub(crate) seeders: i64,
    pub(crate) leechers: i64,
    pub(crate) completed: i64,
    pub(crate) disabled: bool,
}

/// A stored peer record with its absolute expiry timestamp.
#[derive(Clone, Debug)]
pub(crate) struct MemoryPeer {
    pub(crate) peer: TorrentPeer,
    pub(crate) expire_at: u64,
}

pub(crate) struct MemoryStoreInner {
    pub(crate) torrents: RwLock<BTreeMap<InfoHash, MemoryTorrent>>,
    pub(crate) peers: RwLock<BTreeMap<(InfoHash, PeerId), MemoryPeer>>,
    pub(crate) swarms: RwLock<HashMap<(InfoHash, SwarmClass), BTreeSet<PeerId>>>,
    pub(crate) users: RwLock<HashMap<UserId, UserEntryItem>>,
    pub(crate) expired_tx: UnboundedSender<(InfoHash, PeerId)>,
    pub(crate) expired_rx: Mutex<Option<UnboundedReceiver<(InfoHash, PeerId)>>>,
}

/// In-process store engine.
///
/// Backs tests and single-instance deployments. Peer records carry an
/// explicit expiry timestamp; `sweep_expired` evicts them and feeds the
/// same reconciliation channel the Redis engine feeds from keyspace
/// notifications, so both engines age out silent peers the same way.
#[derive(Clone)]
pub struct MemoryStore {
    pub(crate) inner: Arc<MemoryStoreInner>,
}
