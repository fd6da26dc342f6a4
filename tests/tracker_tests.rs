mod common;

use std::net::IpAddr;
use redistracker::common::common::current_time;
use redistracker::config::enums::registration_policy::RegistrationPolicy;
use redistracker::store::traits::store_backend::StoreBackend;
use redistracker::tracker::enums::announce_event::AnnounceEvent;
use redistracker::tracker::errors::TrackerError;
use redistracker::tracker::structs::scrape_query_request::ScrapeQueryRequest;
use redistracker::tracker::structs::torrent_peer::TorrentPeer;
use redistracker::tracker::structs::user_entry_item::UserEntryItem;
use redistracker::tracker::structs::user_id::UserId;
use redistracker::utils::bonus::{calculate_bonus, round_plus};

#[tokio::test]
async fn test_started_announce_registers_leecher() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    let request = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    let (counts, peers) = tracker.handle_announce(&request, None).await.unwrap();

    assert_eq!(counts.seeders, 0, "A peer with bytes left is not a seeder");
    assert_eq!(counts.leechers, 1, "Should have 1 leecher");
    assert!(peers.is_empty(), "The requester never sees itself");
}

#[tokio::test]
async fn test_stopped_announce_is_zero_sum() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, None).await.unwrap();

    let stopped = common::announce(info_hash, peer_id, AnnounceEvent::Stopped, 500, 500, 500);
    let (counts, peers) = tracker.handle_announce(&stopped, None).await.unwrap();

    assert_eq!(counts.seeders, 0);
    assert_eq!(counts.leechers, 0, "Stop must undo the start");
    assert!(peers.is_empty(), "Stopped announces get no peer list");
}

#[tokio::test]
async fn test_stopped_for_unknown_peer_is_a_noop() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();

    let stopped = common::announce(info_hash, common::random_peer_id(), AnnounceEvent::Stopped, 0, 0, 0);
    let (counts, _) = tracker.handle_announce(&stopped, None).await.unwrap();

    assert_eq!(counts.seeders, 0);
    assert_eq!(counts.leechers, 0);
}

#[tokio::test]
async fn test_leecher_to_seeder_transition_moves_counters() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, None).await.unwrap();

    let completed = common::announce(info_hash, peer_id, AnnounceEvent::Completed, 0, 1000, 0);
    let (counts, _) = tracker.handle_announce(&completed, None).await.unwrap();

    assert_eq!(counts.seeders, 1, "Finished peer moves to the seeder set");
    assert_eq!(counts.leechers, 0, "Finished peer leaves the leecher set");
    assert_eq!(counts.completed, 1, "The finish is counted as a snatch");
}

#[tokio::test]
async fn test_completion_counted_once_per_session() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, None).await.unwrap();

    let completed = common::announce(info_hash, peer_id, AnnounceEvent::Completed, 0, 1000, 0);
    tracker.handle_announce(&completed, None).await.unwrap();

    // Regular announces while seeding must not count again.
    for _ in 0..3 {
        let refresh = common::announce(info_hash, peer_id, AnnounceEvent::None, 100, 1000, 0);
        let (counts, _) = tracker.handle_announce(&refresh, None).await.unwrap();
        assert_eq!(counts.completed, 1, "Only the left > 0 to 0 transition counts");
    }
}

#[tokio::test]
async fn test_completion_is_implicit_from_left_reaching_zero() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, None).await.unwrap();

    // The client forgot the completed event but its left hit zero.
    let refresh = common::announce(info_hash, peer_id, AnnounceEvent::None, 0, 1000, 0);
    let (counts, _) = tracker.handle_announce(&refresh, None).await.unwrap();

    assert_eq!(counts.completed, 1);
    assert_eq!(counts.seeders, 1);
}

#[tokio::test]
async fn test_fresh_seeder_is_not_a_snatch() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    // First contact already has nothing left: the peer brought the
    // payload from elsewhere, nothing was snatched here.
    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 0);
    let (counts, _) = tracker.handle_announce(&started, None).await.unwrap();

    assert_eq!(counts.seeders, 1);
    assert_eq!(counts.completed, 0);
}

#[tokio::test]
async fn test_repeated_announce_does_not_double_count() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    for _ in 0..5 {
        let request = common::announce(info_hash, peer_id, AnnounceEvent::None, 0, 0, 1000);
        let (counts, _) = tracker.handle_announce(&request, None).await.unwrap();
        assert_eq!(counts.leechers, 1, "Replayed announces must not inflate counters");
    }
}

#[tokio::test]
async fn test_concurrent_identical_announces_settle_one_delta() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let user_id = UserId::from_passkey("concurrency-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 0);
    tracker.handle_announce(&started, Some(user_id)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let tracker = tracker.clone();
        let request = common::announce(info_hash, peer_id, AnnounceEvent::None, 1000, 0, 0);
        tasks.push(tokio::spawn(async move {
            tracker.handle_announce(&request, Some(user_id)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 1000, "Identical reports must settle exactly once");
}

// Concurrent announces serialize at the store, and a report whose
// counters sit below the stored session is treated as a client restart.
// Exact N*d attribution therefore holds for monotonic interleavings;
// the current-thread test runtime polls spawned tasks in spawn order,
// which pins one down.
#[tokio::test]
async fn test_concurrent_increasing_announces_attribute_every_delta() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let user_id = UserId::from_passkey("increasing-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 0);
    tracker.handle_announce(&started, Some(user_id)).await.unwrap();

    let step = 250u64;
    let tasks: Vec<_> = (1..=4u64)
        .map(|i| {
            let tracker = tracker.clone();
            let request =
                common::announce(info_hash, peer_id, AnnounceEvent::None, i * step, 0, 0);
            tokio::spawn(async move { tracker.handle_announce(&request, Some(user_id)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 4 * step, "Four increments of 250 attribute exactly 1000");
}

#[tokio::test]
async fn test_serial_increasing_announces_accumulate_deltas() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let user_id = UserId::from_passkey("serial-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, Some(user_id)).await.unwrap();

    for step in 1..=4u64 {
        let request =
            common::announce(info_hash, peer_id, AnnounceEvent::None, step * 250, step * 100, 1000);
        tracker.handle_announce(&request, Some(user_id)).await.unwrap();
    }

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 1000);
    assert_eq!(user.downloaded, 400);
}

#[tokio::test]
async fn test_counter_reset_starts_a_new_session() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let user_id = UserId::from_passkey("restart-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    let first = common::announce(info_hash, peer_id, AnnounceEvent::Started, 1000, 0, 0);
    tracker.handle_announce(&first, Some(user_id)).await.unwrap();

    // The client restarted, its counters went backwards. That is a new
    // session and the smaller value is the whole delta, never negative.
    let restarted = common::announce(info_hash, peer_id, AnnounceEvent::Started, 100, 0, 0);
    tracker.handle_announce(&restarted, Some(user_id)).await.unwrap();

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 1100);
}

#[tokio::test]
async fn test_completion_counts_again_after_session_reset() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();

    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, None).await.unwrap();
    let completed = common::announce(info_hash, peer_id, AnnounceEvent::Completed, 0, 1000, 0);
    tracker.handle_announce(&completed, None).await.unwrap();

    // Re-download from scratch: counters reset, left above zero again.
    let again = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&again, None).await.unwrap();
    let finished = common::announce(info_hash, peer_id, AnnounceEvent::None, 0, 1000, 0);
    let (counts, _) = tracker.handle_announce(&finished, None).await.unwrap();

    assert_eq!(counts.completed, 2, "Each session may snatch once");
}

#[tokio::test]
async fn test_expired_peer_is_reconciled_out_of_the_swarm() {
    let tracker = common::create_test_tracker().await;
    assert!(tracker.spawn_expiry_reconciler().await.unwrap());

    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let started = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 1000);
    tracker.handle_announce(&started, None).await.unwrap();

    let ttl = tracker.config.load().tracker_config.peer_ttl;
    let memory = tracker.store.memory().expect("test store is the memory engine");
    assert_eq!(memory.sweep_expired(current_time() + ttl + 1), 1);

    // The reconciler consumes the feed asynchronously.
    for _ in 0..100 {
        let entry = tracker.get_torrent(&info_hash).await.unwrap().unwrap();
        if entry.leechers == 0 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("expired peer was never reconciled");
}

#[tokio::test]
async fn test_peer_list_excludes_requester_and_honors_numwant() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();

    let mut swarm = Vec::new();
    for _ in 0..10 {
        let peer_id = common::random_peer_id();
        swarm.push(peer_id);
        let request = common::announce(info_hash, peer_id, AnnounceEvent::Started, 0, 0, 0);
        tracker.handle_announce(&request, None).await.unwrap();
    }

    let requester = common::random_peer_id();
    let mut request = common::announce(info_hash, requester, AnnounceEvent::Started, 0, 0, 1000);
    request.numwant = 4;
    let (_, peers) = tracker.handle_announce(&request, None).await.unwrap();

    assert_eq!(peers.len(), 4);
    assert!(peers.iter().all(|(peer_id, _)| *peer_id != requester));
}

#[tokio::test]
async fn test_seeders_are_served_leechers_first() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();

    let seeder = common::random_peer_id();
    tracker
        .handle_announce(&common::announce(info_hash, seeder, AnnounceEvent::Started, 0, 0, 0), None)
        .await
        .unwrap();
    let leecher = common::random_peer_id();
    tracker
        .handle_announce(&common::announce(info_hash, leecher, AnnounceEvent::Started, 0, 0, 500), None)
        .await
        .unwrap();

    let requester = common::random_peer_id();
    let mut request = common::announce(info_hash, requester, AnnounceEvent::None, 0, 0, 0);
    request.numwant = 1;
    let (_, peers) = tracker.handle_announce(&request, None).await.unwrap();

    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].0, leecher, "A seeder wants leechers, not other seeders");
}

#[tokio::test]
async fn test_disabled_torrent_rejects_announces() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    tracker.add_torrent(&info_hash).await.unwrap();
    tracker.set_torrent_disabled(&info_hash, true).await.unwrap();

    let request = common::announce(info_hash, common::random_peer_id(), AnnounceEvent::Started, 0, 0, 0);
    let error = tracker.handle_announce(&request, None).await.unwrap_err();

    assert!(matches!(error, TrackerError::TorrentDisabled(_)));
    assert_eq!(error.http_status(), 403);
}

#[tokio::test]
async fn test_closed_policy_rejects_unknown_torrents() {
    let mut config = common::create_test_config();
    config.tracker_config.registration_policy = RegistrationPolicy::Closed;
    let tracker = common::create_test_tracker_with(config).await;

    let request = common::announce(
        common::random_info_hash(),
        common::random_peer_id(),
        AnnounceEvent::Started,
        0,
        0,
        0,
    );
    let error = tracker.handle_announce(&request, None).await.unwrap_err();

    assert!(matches!(error, TrackerError::UnknownTorrent(_)));
    assert_eq!(error.http_status(), 404);
}

#[tokio::test]
async fn test_scrape_reports_zeros_for_unknown_torrents_when_open() {
    let tracker = common::create_test_tracker().await;
    let known = common::random_info_hash();
    tracker
        .handle_announce(&common::announce(known, common::random_peer_id(), AnnounceEvent::Started, 0, 0, 0), None)
        .await
        .unwrap();
    let unknown = common::random_info_hash();

    let request = ScrapeQueryRequest { info_hash: vec![known, unknown] };
    let result = tracker.handle_scrape(&request).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].1.seeders, 1);
    assert_eq!(result[1].1.seeders, 0);
    assert_eq!(result[1].1.completed, 0);
}

#[tokio::test]
async fn test_scrape_rejects_unknown_torrents_when_closed() {
    let mut config = common::create_test_config();
    config.tracker_config.registration_policy = RegistrationPolicy::Closed;
    let tracker = common::create_test_tracker_with(config).await;

    let request = ScrapeQueryRequest { info_hash: vec![common::random_info_hash()] };
    let error = tracker.handle_scrape(&request).await.unwrap_err();

    assert!(matches!(error, TrackerError::UnknownTorrent(_)));
}

#[tokio::test]
async fn test_inactive_user_cannot_authenticate() {
    let tracker = common::create_test_tracker().await;
    let user_id = UserId::from_passkey("disabled-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: false, ..Default::default() })
        .await
        .unwrap();

    let error = tracker.authenticate("disabled-passkey").await.unwrap_err();
    assert_eq!(error.http_status(), 401);
    assert!(tracker.authenticate("never-registered").await.is_err());
    assert!(tracker.authenticate("").await.is_err());
}

#[tokio::test]
async fn test_anonymous_announce_is_refused_by_default() {
    let mut config = common::create_test_config();
    config.tracker_config.allow_anonymous_announces = false;
    let tracker = common::create_test_tracker_with(config).await;

    let request = common::announce(
        common::random_info_hash(),
        common::random_peer_id(),
        AnnounceEvent::Started,
        0,
        0,
        1000,
    );
    let error = tracker.handle_announce(&request, None).await.unwrap_err();
    assert!(matches!(error, TrackerError::Unauthorized(_)));
    assert_eq!(error.http_status(), 401);
}

#[tokio::test]
async fn test_passkey_announce_passes_the_anonymous_gate() {
    let mut config = common::create_test_config();
    config.tracker_config.allow_anonymous_announces = false;
    let tracker = common::create_test_tracker_with(config).await;
    let user_id = UserId::from_passkey("gated-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    let request = common::announce(
        common::random_info_hash(),
        common::random_peer_id(),
        AnnounceEvent::Started,
        0,
        0,
        1000,
    );
    let (counts, _) = tracker.handle_announce(&request, Some(user_id)).await.unwrap();
    assert_eq!(counts.leechers, 1);
}

#[tokio::test]
async fn test_seeding_settlement_accrues_rounded_credit() {
    let tracker = common::create_test_tracker().await;
    let user_id = UserId::from_passkey("credit-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    let multiplier = tracker.config.load().tracker_config.credit_multiplier;
    tracker
        .settle_transfer(&user_id, 5_000_000_000, 0, false, true, 7200, 5_000_000_000)
        .await
        .unwrap();

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 5_000_000_000);
    assert_eq!(user.credit, round_plus(calculate_bonus(7200, 5_000_000_000, multiplier), 2));
    assert!(user.credit > 0.0);
}

// A leecher that finishes 5 GB after ten minutes: one snatch, a
// continuing session, and credit from the 600 second / 5 GB pair.
#[tokio::test]
async fn test_timed_implicit_completion_awards_rounded_credit() {
    let tracker = common::create_test_tracker().await;
    let info_hash = common::random_info_hash();
    let peer_id = common::random_peer_id();
    let user_id = UserId::from_passkey("timed-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();
    tracker.add_torrent(&info_hash).await.unwrap();

    // Drive the store record directly so the session clock is pinned.
    let start = current_time();
    let leeching = TorrentPeer {
        ip: IpAddr::V4("127.0.0.1".parse().expect("literal parses")),
        port: 6881,
        user: Some(user_id),
        uploaded: 0,
        downloaded: 0,
        left: 100,
        seeding: false,
        completed: false,
        session_start: start,
        last_announce: start,
    };
    tracker
        .store
        .upsert_peer(&info_hash, &peer_id, &leeching, 3600)
        .await
        .unwrap();
    let finished = TorrentPeer {
        uploaded: 5_000_000_000,
        left: 0,
        seeding: true,
        session_start: start + 600,
        last_announce: start + 600,
        ..leeching
    };
    let upsert = tracker
        .store
        .upsert_peer(&info_hash, &peer_id, &finished, 3600)
        .await
        .unwrap();

    assert!(!upsert.new_session, "Counters only grew, the session continues");
    assert!(upsert.completed_now, "left reached zero for the first time");
    assert_eq!(upsert.session_start, start, "The session anchor is the first contact");
    let elapsed = finished.last_announce - upsert.session_start;
    assert_eq!(elapsed, 600);
    assert_eq!(upsert.delta_uploaded, 5_000_000_000);

    let multiplier = tracker.config.load().tracker_config.credit_multiplier;
    tracker
        .settle_transfer(
            &user_id,
            upsert.delta_uploaded,
            upsert.delta_downloaded,
            upsert.completed_now,
            true,
            elapsed,
            finished.uploaded,
        )
        .await
        .unwrap();

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.uploaded, 5_000_000_000);
    assert_eq!(user.completed, 1);
    assert_eq!(user.credit, round_plus(calculate_bonus(600, 5_000_000_000, multiplier), 2));
    assert!(user.credit > 0.0);
}

#[tokio::test]
async fn test_leeching_settlement_earns_no_credit() {
    let tracker = common::create_test_tracker().await;
    let user_id = UserId::from_passkey("leech-passkey");
    tracker
        .add_user(&user_id, &UserEntryItem { active: true, ..Default::default() })
        .await
        .unwrap();

    tracker
        .settle_transfer(&user_id, 1_000_000_000, 2_000_000_000, false, false, 3600, 1_000_000_000)
        .await
        .unwrap();

    let user = tracker.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.credit, 0.0, "Credit rewards seeding only");
    assert_eq!(user.downloaded, 2_000_000_000);
}
