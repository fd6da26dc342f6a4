use std::cmp::Reverse;
use std::net::IpAddr;
use crate::geo::impls::geo_db::distance_km;
use crate::store::traits::store_backend::StoreBackend;
use crate::tracker::enums::swarm_class::SwarmClass;
use crate::tracker::errors::TrackerError;
use crate::tracker::structs::info_hash::InfoHash;
use crate::tracker::structs::peer_id::PeerId;
use crate::tracker::structs::peer_upsert::PeerUpsert;
use crate::tracker::structs::torrent_peer::TorrentPeer;
use crate::tracker::structs::torrent_tracker::TorrentTracker;

impl TorrentTracker {
    /// Applies the membership consequence of an announce upsert.
    ///
    /// Every counter adjustment is gated on the set operation that
    /// justifies it actually changing something, so replayed or
    /// concurrent announces cannot double count. A move between
    /// classes adjusts both counters in the same logical step.
    pub async fn apply_membership(
        &self,
        info_hash: &InfoHash,
        peer_id: &PeerId,
        upsert: &PeerUpsert,
        seeding: bool,
    ) -> Result<(), TrackerError> {
        let desired = if seeding { SwarmClass::Seeders } else { SwarmClass::Leechers };
        if upsert.existed && upsert.was_seeding != seeding {
            let from = if upsert.was_seeding { SwarmClass::Seeders } else { SwarmClass::Leechers };
            if self.store.swarm_move(info_hash, from, desired, peer_id).await? {
                self.adjust_counter(info_hash, from.key_suffix(), -1).await?;
                self.adjust_counter(info_hash, desired.key_suffix(), 1).await?;
                return Ok(());
            }
            // Source set had no entry (already reconciled away), fall
            // through to a plain add of the desired class.
        }
        if self.store.swarm_add(info_hash, desired, peer_id).await? {
            self.adjust_counter(info_hash, desired.key_suffix(), 1).await?;
        }
        Ok(())
    }

    /// Removes a peer from whichever membership set holds it and
    /// decrements the matching counter. Used for `stopped` announces
    /// and TTL-expired records alike.
    pub async fn detach_peer(&self, info_hash: &InfoHash, peer_id: &PeerId) -> Result<(), TrackerError> {
        if self.store.swarm_remove(info_hash, SwarmClass::Seeders, peer_id).await? {
            self.adjust_counter(info_hash, SwarmClass::Seeders.key_suffix(), -1).await?;
        } else if self.store.swarm_remove(info_hash, SwarmClass::Leechers, peer_id).await? {
            self.adjust_counter(info_hash, SwarmClass::Leechers.key_suffix(), -1).await?;
        }
        Ok(())
    }

    pub async fn get_counts(&self, info_hash: &InfoHash) -> Result<(u64, u64, u64), TrackerError> {
        let entry = self.get_torrent(info_hash).await?.unwrap_or_default();
        Ok((entry.seeders, entry.leechers, entry.completed))
    }

    /// Assembles a peer list for an announce response.
    ///
    /// Leechers are served seeders first; seeders are served leechers
    /// first. The requester itself is excluded. Within each class,
    /// nearer peers come first when a geo dataset is loaded, ties
    /// broken by most recent announce.
    pub async fn list_peers(
        &self,
        info_hash: &InfoHash,
        exclude: &PeerId,
        requester_seeding: bool,
        requester_ip: IpAddr,
        numwant: usize,
    ) -> Result<Vec<(PeerId, TorrentPeer)>, TrackerError> {
        if numwant == 0 {
            return Ok(Vec::new());
        }
        let classes = if requester_seeding {
            [SwarmClass::Leechers, SwarmClass::Seeders]
        } else {
            [SwarmClass::Seeders, SwarmClass::Leechers]
        };
        let requester_location = self.locate(requester_ip);
        let mut result = Vec::with_capacity(numwant);
        for class in classes {
            if result.len() >= numwant {
                break;
            }
            // Fetch one extra so excluding the requester still fills up.
            let mut peers = self.store.swarm_peers(info_hash, class, numwant + 1).await?;
            peers.retain(|(peer_id, _)| peer_id != exclude);
            if let Some(here) = &requester_location {
                peers.sort_by(|(_, a), (_, b)| {
                    let distance = |peer: &TorrentPeer| {
                        self.locate(peer.ip)
                            .map(|there| distance_km(here, &there))
                            .unwrap_or(f64::MAX)
                    };
                    (distance(a), Reverse(a.last_announce))
                        .partial_cmp(&(distance(b), Reverse(b.last_announce)))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            } else {
                peers.sort_by_key(|(_, peer)| Reverse(peer.last_announce));
            }
            peers.truncate(numwant - result.len());
            result.extend(peers);
        }
        Ok(result)
    }
}
