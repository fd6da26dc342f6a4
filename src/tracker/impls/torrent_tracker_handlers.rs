use std::collections::HashMap;
use std::net::IpAddr;
use log::debug;
use crate::common::common::current_time;
use crate::config::enums::registration_policy::RegistrationPolicy;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::enums::announce_event::AnnounceEvent;
use crate::tracker::errors::TrackerError;
use crate::tracker::structs::announce_query_request::AnnounceQueryRequest;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::scrape_query_request::ScrapeQueryRequest;
use crate::tracker::structs::torrent_entry::TorrentEntry;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::torrent_tracker::TorrentTracker;
use crate::tracker::structs::user_id::UserId;

type QueryMap = HashMap<String, Vec<Vec<u8>>>;

fn single_binary<'a>(query: &'a QueryMap, key: &str) -> Result<&'a [u8], TrackerError> {
    let values = query
        .get(key)
        .ok_or_else(|| TrackerError::MalformedRequest(format!("missing {}", key)))?;
    match values.as_slice() {
        [value] => Ok(value),
        [] => Err(TrackerError::MalformedRequest(format!("missing {}", key))),
        _ => Err(TrackerError::MalformedRequest(format!("duplicate {}", key))),
    }
}

fn twenty_bytes(query: &QueryMap, key: &str) -> Result<[u8; 20], TrackerError> {
    single_binary(query, key)?
        .try_into()
        .map_err(|_| TrackerError::MalformedRequest(format!("{} must be 20 bytes", key)))
}

fn numeric(query: &QueryMap, key: &str) -> Result<u64, TrackerError> {
    let raw = single_binary(query, key)?;
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| TrackerError::MalformedRequest(format!("invalid numeric field {}", key)))
}

fn flag(query: &QueryMap, key: &str) -> bool {
    query
        .get(key)
        .and_then(|values| values.first())
        .map(|value| value == b"1")
        .unwrap_or(false)
}

impl TorrentTracker {
    pub fn validate_announce_request(
        &self,
        remote_addr: IpAddr,
        query: QueryMap,
    ) -> Result<AnnounceQueryRequest, TrackerError> {
        let config = self.config.load();
        let info_hash = InfoHash(twenty_bytes(&query, "info_hash")?);
        let peer_id = PeerId(twenty_bytes(&query, "peer_id")?);
        let port = numeric(&query, "port")?;
        if port == 0 || port > u16::MAX as u64 {
            return Err(TrackerError::MalformedRequest("invalid port".to_string()));
        }
        let event = match query.get("event").and_then(|values| values.first()) {
            None => AnnounceEvent::None,
            Some(value) => match value.as_slice() {
                b"" => AnnounceEvent::None,
                b"started" => AnnounceEvent::Started,
                b"stopped" => AnnounceEvent::Stopped,
                b"completed" => AnnounceEvent::Completed,
                _ => return Err(TrackerError::MalformedRequest("unknown event".to_string())),
            },
        };
        let cap = config.tracker_config.peers_returned;
        let numwant = match query.get("numwant").and_then(|values| values.first()) {
            None => cap,
            Some(_) => numeric(&query, "numwant")?.min(cap),
        };
        Ok(AnnounceQueryRequest {
            info_hash,
            peer_id,
            port: port as u16,
            uploaded: numeric(&query, "uploaded")?,
            downloaded: numeric(&query, "downloaded")?,
            left: numeric(&query, "left")?,
            compact: flag(&query, "compact"),
            no_peer_id: flag(&query, "no_peer_id"),
            event,
            remote_addr,
            numwant,
        })
    }

    pub fn validate_scrape_request(&self, query: QueryMap) -> Result<ScrapeQueryRequest, TrackerError> {
        let values = query
            .get("info_hash")
            .ok_or_else(|| TrackerError::MalformedRequest("missing info_hash".to_string()))?;
        if values.is_empty() {
            return Err(TrackerError::MalformedRequest("missing info_hash".to_string()));
        }
        let mut info_hash = Vec::with_capacity(values.len());
        for value in values {
            let bytes: [u8; 20] = value
                .as_slice()
                .try_into()
                .map_err(|_| TrackerError::MalformedRequest("info_hash must be 20 bytes".to_string()))?;
            info_hash.push(InfoHash(bytes));
        }
        Ok(ScrapeQueryRequest { info_hash })
    }

    /// Runs one announce through the full transition protocol and
    /// returns the counts and peer list the response is rendered from.
    pub async fn handle_announce(
        &self,
        request: &AnnounceQueryRequest,
        user_id: Option<UserId>,
    ) -> Result<(TorrentEntry, Vec<(PeerId, TorrentPeer)>), TrackerError> {
        let config = self.config.load();
        if user_id.is_none() && !config.tracker_config.allow_anonymous_announces {
            return Err(TrackerError::Unauthorized("announce requires a passkey".to_string()));
        }
        let entry = match self.get_torrent(&request.info_hash).await? {
            Some(entry) => entry,
            None => match config.tracker_config.registration_policy {
                RegistrationPolicy::Open => {
                    self.add_torrent(&request.info_hash).await?;
                    TorrentEntry::default()
                }
                RegistrationPolicy::Closed => {
                    return Err(TrackerError::UnknownTorrent(request.info_hash));
                }
            },
        };
        if entry.disabled {
            return Err(TrackerError::TorrentDisabled(request.info_hash));
        }

        let now = current_time();
        let seeding = request.left == 0;

        if request.event == AnnounceEvent::Stopped {
            self.handle_stopped(request, now).await?;
            let counts = self.get_torrent(&request.info_hash).await?.unwrap_or_default();
            return Ok((counts, Vec::new()));
        }

        let candidate = TorrentPeer {
            ip: request.remote_addr,
            port: request.port,
            user: user_id,
            uploaded: request.uploaded,
            downloaded: request.downloaded,
            left: request.left,
            seeding,
            completed: false,
            session_start: now,
            last_announce: now,
        };
        let upsert = self
            .store
            .upsert_peer(&request.info_hash, &request.peer_id, &candidate, config.tracker_config.peer_ttl)
            .await?;
        debug!(
            "[Announce] {} peer {} seeding {} outcome {:?}",
            request.info_hash, request.peer_id, seeding, upsert
        );
        self.apply_membership(&request.info_hash, &request.peer_id, &upsert, seeding).await?;
        if upsert.completed_now {
            self.adjust_counter(&request.info_hash, "completed", 1).await?;
        }
        if let Some(user_id) = user_id {
            self.settle_transfer(
                &user_id,
                upsert.delta_uploaded,
                upsert.delta_downloaded,
                upsert.completed_now,
                seeding,
                now.saturating_sub(upsert.session_start),
                request.uploaded,
            ).await?;
        }

        let counts = self.get_torrent(&request.info_hash).await?.unwrap_or_default();
        let peers = self
            .list_peers(
                &request.info_hash,
                &request.peer_id,
                seeding,
                request.remote_addr,
                request.numwant as usize,
            )
            .await?;
        Ok((counts, peers))
    }

    /// `stopped`: drop the record and membership, then settle the
    /// session's final deltas onto the user account. Cumulative totals
    /// on the record are not reset beforehand, they are what the final
    /// settlement is computed from.
    async fn handle_stopped(&self, request: &AnnounceQueryRequest, now: u64) -> Result<(), TrackerError> {
        let Some(prior) = self.store.remove_peer(&request.info_hash, &request.peer_id).await? else {
            return Ok(());
        };
        self.detach_peer(&request.info_hash, &request.peer_id).await?;
        if let Some(user_id) = prior.user {
            let (delta_uploaded, delta_downloaded) =
                if request.uploaded >= prior.uploaded && request.downloaded >= prior.downloaded {
                    (request.uploaded - prior.uploaded, request.downloaded - prior.downloaded)
                } else {
                    // Counters went backwards, the stop belongs to a
                    // fresh session we never saw announce.
                    (request.uploaded, request.downloaded)
                };
            self.settle_transfer(
                &user_id,
                delta_uploaded,
                delta_downloaded,
                false,
                prior.seeding,
                now.saturating_sub(prior.session_start),
                request.uploaded,
            ).await?;
        }
        Ok(())
    }

    /// Scrape is a pure read: per-torrent counts, no membership
    /// detail, no state mutation.
    pub async fn handle_scrape(
        &self,
        request: &ScrapeQueryRequest,
    ) -> Result<Vec<(InfoHash, TorrentEntry)>, TrackerError> {
        let config = self.config.load();
        let mut result = Vec::with_capacity(request.info_hash.len());
        for info_hash in &request.info_hash {
            match self.get_torrent(info_hash).await? {
                Some(entry) => result.push((*info_hash, entry)),
                None => match config.tracker_config.registration_policy {
                    // An open tracker reports zeros for swarms it has
                    // simply not seen yet.
                    RegistrationPolicy::Open => result.push((*info_hash, TorrentEntry::default())),
                    RegistrationPolicy::Closed => {
                        return Err(TrackerError::UnknownTorrent(*info_hash));
                    }
                },
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::config::structs::config_watcher::ConfigWatcher;
    use crate::config::structs::configuration::Configuration;
    use crate::store::enums::store_engine::StoreEngine;
    use crate::store::structs::memory_store::MemoryStore;
    use crate::store::structs::store_connector::StoreConnector;

    fn test_tracker() -> TorrentTracker {
        let watcher = Arc::new(ConfigWatcher::new(Configuration::init()));
        let store = StoreConnector {
            redis: None,
            memory: Some(MemoryStore::new()),
            engine: StoreEngine::memory,
        };
        TorrentTracker::new(watcher, store)
    }

    fn base_query() -> QueryMap {
        let mut query = QueryMap::new();
        query.insert("info_hash".to_string(), vec![vec![0xaa; 20]]);
        query.insert("peer_id".to_string(), vec![vec![0xbb; 20]]);
        query.insert("port".to_string(), vec![b"6881".to_vec()]);
        query.insert("uploaded".to_string(), vec![b"0".to_vec()]);
        query.insert("downloaded".to_string(), vec![b"0".to_vec()]);
        query.insert("left".to_string(), vec![b"100".to_vec()]);
        query
    }

    #[test]
    fn test_validate_announce_accepts_minimal_query() {
        let tracker = test_tracker();
        let request = tracker
            .validate_announce_request("127.0.0.1".parse().unwrap(), base_query())
            .unwrap();
        assert_eq!(request.info_hash, InfoHash([0xaa; 20]));
        assert_eq!(request.event, AnnounceEvent::None);
        assert_eq!(request.numwant, 50);
        assert!(!request.compact);
    }

    #[test]
    fn test_validate_announce_rejects_short_info_hash() {
        let tracker = test_tracker();
        let mut query = base_query();
        query.insert("info_hash".to_string(), vec![vec![0xaa; 19]]);
        let error = tracker
            .validate_announce_request("127.0.0.1".parse().unwrap(), query)
            .unwrap_err();
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn test_validate_announce_rejects_bad_numeric() {
        let tracker = test_tracker();
        let mut query = base_query();
        query.insert("uploaded".to_string(), vec![b"not-a-number".to_vec()]);
        assert!(matches!(
            tracker.validate_announce_request("127.0.0.1".parse().unwrap(), query),
            Err(TrackerError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_validate_announce_rejects_unknown_event() {
        let tracker = test_tracker();
        let mut query = base_query();
        query.insert("event".to_string(), vec![b"paused".to_vec()]);
        assert!(tracker
            .validate_announce_request("127.0.0.1".parse().unwrap(), query)
            .is_err());
    }

    #[test]
    fn test_validate_announce_caps_numwant() {
        let tracker = test_tracker();
        let mut query = base_query();
        query.insert("numwant".to_string(), vec![b"5000".to_vec()]);
        let request = tracker
            .validate_announce_request("127.0.0.1".parse().unwrap(), query)
            .unwrap();
        assert_eq!(request.numwant, 50);
    }

    #[test]
    fn test_validate_scrape_collects_all_hashes() {
        let tracker = test_tracker();
        let mut query = QueryMap::new();
        query.insert("info_hash".to_string(), vec![vec![0xaa; 20], vec![0xbb; 20]]);
        let request = tracker.validate_scrape_request(query).unwrap();
        assert_eq!(request.info_hash.len(), 2);
    }

    #[test]
    fn test_validate_scrape_requires_a_hash() {
        let tracker = test_tracker();
        assert!(tracker.validate_scrape_request(QueryMap::new()).is_err());
    }
}
