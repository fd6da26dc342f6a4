mod common;

use std::net::IpAddr;
use redistracker::common::common::current_time;
use redistracker::store::structs::memory_store::MemoryStore;
use redistracker::store::traits::store_backend::StoreBackend;
use redistracker::tracker::enums::swarm_class::SwarmClass;
use redistracker::tracker::structs::peer_id::PeerId;
use redistracker::tracker::structs::torrent_peer::TorrentPeer;
use redistracker::tracker::structs::user_entry_item::UserEntryItem;
use redistracker::tracker::structs::user_id::UserId;

fn test_peer(uploaded: u64, downloaded: u64, left: u64, now: u64) -> TorrentPeer {
    TorrentPeer {
        ip: IpAddr::V4("127.0.0.1".parse().expect("literal parses")),
        port: 6881,
        user: None,
        uploaded,
        downloaded,
        left,
        seeding: left == 0,
        completed: false,
        session_start: now,
        last_announce: now,
    }
}

#[tokio::test]
async fn test_register_torrent_is_idempotent() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();

    assert!(store.register_torrent(&info_hash).await.unwrap());
    assert!(!store.register_torrent(&info_hash).await.unwrap());

    let entry = store.get_torrent(&info_hash).await.unwrap().unwrap();
    assert_eq!(entry.seeders, 0);
    assert!(!entry.disabled);
}

#[tokio::test]
async fn test_upsert_first_contact_reports_full_values_as_delta() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let now = current_time();

    let upsert = store
        .upsert_peer(&info_hash, &peer_id, &test_peer(500, 200, 100, now), 3600)
        .await
        .unwrap();

    assert!(!upsert.existed);
    assert!(upsert.new_session);
    assert_eq!(upsert.delta_uploaded, 500);
    assert_eq!(upsert.delta_downloaded, 200);
    assert!(!upsert.completed_now);
}

#[tokio::test]
async fn test_upsert_continues_session_on_monotonic_counters() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let now = current_time();

    store
        .upsert_peer(&info_hash, &peer_id, &test_peer(500, 200, 100, now), 3600)
        .await
        .unwrap();
    let upsert = store
        .upsert_peer(&info_hash, &peer_id, &test_peer(800, 300, 0, now + 60), 3600)
        .await
        .unwrap();

    assert!(upsert.existed);
    assert!(!upsert.new_session);
    assert_eq!(upsert.delta_uploaded, 300);
    assert_eq!(upsert.delta_downloaded, 100);
    assert_eq!(upsert.session_start, now, "Session anchor survives refreshes");
    assert!(upsert.completed_now, "left went from 100 to 0 within the session");
}

#[tokio::test]
async fn test_upsert_detects_backwards_counters_as_new_session() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let now = current_time();

    store
        .upsert_peer(&info_hash, &peer_id, &test_peer(500, 200, 0, now), 3600)
        .await
        .unwrap();
    let upsert = store
        .upsert_peer(&info_hash, &peer_id, &test_peer(100, 0, 0, now + 60), 3600)
        .await
        .unwrap();

    assert!(upsert.existed);
    assert!(upsert.new_session);
    assert_eq!(upsert.delta_uploaded, 100, "Fresh session delta is the raw value");
    assert_eq!(upsert.session_start, now + 60);
    assert!(!upsert.completed_now, "A session that starts finished snatched nothing");
}

#[tokio::test]
async fn test_completion_flag_persists_across_refreshes() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let now = current_time();

    store
        .upsert_peer(&info_hash, &peer_id, &test_peer(0, 0, 100, now), 3600)
        .await
        .unwrap();
    let first = store
        .upsert_peer(&info_hash, &peer_id, &test_peer(0, 100, 0, now + 10), 3600)
        .await
        .unwrap();
    let second = store
        .upsert_peer(&info_hash, &peer_id, &test_peer(50, 100, 0, now + 20), 3600)
        .await
        .unwrap();

    assert!(first.completed_now);
    assert!(!second.completed_now);
}

#[tokio::test]
async fn test_swarm_add_remove_and_move_report_membership_changes() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    assert!(store.swarm_add(&info_hash, SwarmClass::Leechers, &peer_id).await.unwrap());
    assert!(!store.swarm_add(&info_hash, SwarmClass::Leechers, &peer_id).await.unwrap());

    assert!(store
        .swarm_move(&info_hash, SwarmClass::Leechers, SwarmClass::Seeders, &peer_id)
        .await
        .unwrap());
    assert!(
        !store
            .swarm_move(&info_hash, SwarmClass::Leechers, SwarmClass::Seeders, &peer_id)
            .await
            .unwrap(),
        "Moving from an empty source must report no change"
    );

    let members = store.swarm_members(&info_hash, SwarmClass::Seeders).await.unwrap();
    assert_eq!(members, vec![peer_id]);

    assert!(store.swarm_remove(&info_hash, SwarmClass::Seeders, &peer_id).await.unwrap());
    assert!(!store.swarm_remove(&info_hash, SwarmClass::Seeders, &peer_id).await.unwrap());
}

#[tokio::test]
async fn test_swarm_peers_skips_members_without_records() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    let now = current_time();

    let with_record = common::random_peer_id();
    store
        .upsert_peer(&info_hash, &with_record, &test_peer(0, 0, 0, now), 3600)
        .await
        .unwrap();
    store.swarm_add(&info_hash, SwarmClass::Seeders, &with_record).await.unwrap();

    // Membership without a record happens between expiry and
    // reconciliation. Listings must not surface the ghost.
    let ghost = common::random_peer_id();
    store.swarm_add(&info_hash, SwarmClass::Seeders, &ghost).await.unwrap();

    let peers = store.swarm_peers(&info_hash, SwarmClass::Seeders, 50).await.unwrap();
    let ids: Vec<PeerId> = peers.iter().map(|(peer_id, _)| *peer_id).collect();
    assert!(ids.contains(&with_record));
    assert!(!ids.contains(&ghost));
}

#[tokio::test]
async fn test_expiration_feed_delivers_swept_peers() {
    let store = MemoryStore::new();
    let mut feed = store.start_expiration_feed().await.unwrap().unwrap();
    assert!(
        store.start_expiration_feed().await.unwrap().is_none(),
        "The feed can only be taken once"
    );

    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let now = current_time();
    store
        .upsert_peer(&info_hash, &peer_id, &test_peer(0, 0, 0, now), 600)
        .await
        .unwrap();

    assert_eq!(store.sweep_expired(now + 599), 0, "TTL not reached yet");
    assert_eq!(store.sweep_expired(now + 601), 1);
    assert_eq!(feed.recv().await, Some((info_hash, peer_id)));
    assert!(store.get_peer(&info_hash, &peer_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_add_transfer_accumulates() {
    let store = MemoryStore::new();
    let user_id = UserId::from_passkey("store-passkey");
    store
        .put_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    store.user_add_transfer(&user_id, 100, 50, false, 0.25).await.unwrap();
    store.user_add_transfer(&user_id, 200, 0, true, 0.50).await.unwrap();

    let user = store.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 300);
    assert_eq!(user.downloaded, 50);
    assert_eq!(user.completed, 1);
    assert!((user.credit - 0.75).abs() < f64::EPSILON);
    assert!(user.active);
}

#[tokio::test]
async fn test_counters_clamp_at_zero_in_listings() {
    let store = MemoryStore::new();
    let info_hash = common::random_info_hash();
    store.register_torrent(&info_hash).await.unwrap();

    assert_eq!(store.torrent_incr(&info_hash, "seeders", -3).await.unwrap(), -3);

    let entry = store.get_torrent(&info_hash).await.unwrap().unwrap();
    assert_eq!(entry.seeders, 0, "Raw negatives never leak into entries");
}
