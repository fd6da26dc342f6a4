#![allow(dead_code)]
use std::net::IpAddr;
use std::sync::Arc;
use rand::Rng;
use tempfile::TempDir;
use redistracker::config::structs::config_watcher::ConfigWatcher;
use redistracker::config::structs::configuration::Configuration;
use redistracker::store::enums::store_engine::StoreEngine;
use redistracker::store::structs::store_connector::StoreConnector;
use redistracker::tracker::enums::announce_event::AnnounceEvent;
use redistracker::tracker::structs::announce_query_request::AnnounceQueryRequest;
use redistracker::tracker::structs::info_hash::InfoHash;
use redistracker::tracker::structs::peer_id::PeerId;
use redistracker::tracker::structs::torrent_tracker::TorrentTracker;

pub type TestTracker = Arc<TorrentTracker>;

pub fn create_test_config() -> Configuration {
    let mut config: Configuration = Configuration::init();
    config.store.engine = StoreEngine::memory;
    // Swarm tests announce without a passkey; the default denies that.
    config.tracker_config.allow_anonymous_announces = true;
    config
}

pub async fn create_test_tracker() -> TestTracker {
    create_test_tracker_with(create_test_config()).await
}

pub async fn create_test_tracker_with(config: Configuration) -> TestTracker {
    let store = StoreConnector::new(&config.store)
        .await
        .expect("memory engine construction cannot fail");
    Arc::new(TorrentTracker::new(Arc::new(ConfigWatcher::new(config)), store))
}

pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn random_info_hash() -> InfoHash {
    let mut rng = rand::rng();
    let bytes: [u8; 20] = rng.random();
    InfoHash(bytes)
}

pub fn random_peer_id() -> PeerId {
    let mut rng = rand::rng();
    let bytes: [u8; 20] = rng.random();
    PeerId(bytes)
}

pub fn announce(
    info_hash: InfoHash,
    peer_id: PeerId,
    event: AnnounceEvent,
    uploaded: u64,
    downloaded: u64,
    left: u64,
) -> AnnounceQueryRequest {
    AnnounceQueryRequest {
        info_hash,
        peer_id,
        port: 6881,
        uploaded,
        downloaded,
        left,
        compact: true,
        no_peer_id: false,
        event,
        remote_addr: IpAddr::V4("127.0.0.1".parse().expect("literal parses")),
        numwant: 50,
    }
}
