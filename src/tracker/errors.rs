use thiserror::Error;
use crate::store::errors::StoreError;
use crate::tracker::structs::info_hash::InfoHash;

/// Request-level tracker failures.
///
/// Every variant maps to an HTTP status code and renders as a bencoded
/// dictionary with a `failure reason` key, so BitTorrent clients and
/// plain HTTP middleboxes both see a meaningful outcome.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{0}")]
    MalformedRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("unknown torrent: {0}")]
    UnknownTorrent(InfoHash),

    #[error("torrent disabled: {0}")]
    TorrentDisabled(InfoHash),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl TrackerError {
    pub fn http_status(&self) -> u16 {
        match self {
            TrackerError::MalformedRequest(_) => 400,
            TrackerError::Unauthorized(_) => 401,
            TrackerError::UnknownTorrent(_) => 404,
            TrackerError::TorrentDisabled(_) => 403,
            TrackerError::StoreUnavailable(_) => 503,
            TrackerError::InternalInconsistency(_) => 500,
        }
    }
}
