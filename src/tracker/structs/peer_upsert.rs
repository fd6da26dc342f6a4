/// Outcome of atomically upserting a peer record.
///
/// Computed inside the store in one step against the prior record, so
/// two concurrent announces for the same peer can never both claim the
/// same transfer delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerUpsert {
    /// A record for this (info hash, peer id) already existed.
    pub existed: bool,
    /// The client restarted its session (counters went backwards).
    pub new_session: bool,
    /// Bytes uploaded since the prior announce of this session.
    pub delta_uploaded: u64,
    /// Bytes downloaded since the prior announce of this session.
    pub delta_downloaded: u64,
    /// Unix timestamp the current session began.
    pub session_start: u64,
    /// This announce moved the peer from leeching to seeding for the
    /// first time in this session.
    pub completed_now: bool,
    /// The prior record was already seeding.
    pub was_seeding: bool,
}
