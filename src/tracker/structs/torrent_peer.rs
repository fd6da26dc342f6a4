use std::net::IpAddr;
use serde::Serialize;
use crate::tracker::structs::user_id::UserId;

/// A peer record as persisted per (info hash, peer id) pair.
///
/// Transfer totals are the client's session-cumulative values from its
/// latest announce. `session_start` anchors session-length based credit
/// and survives record refreshes within one session.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct TorrentPeer {
    pub ip: IpAddr,
    pub port: u16,
    pub user: Option<UserId>,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub seeding: bool,
    pub completed: bool,
    pub session_start: u64,
    pub last_announce: u64,
}
