// Performance benchmarks for RedisTracker
// Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::net::IpAddr;
use std::sync::Arc;
use redistracker::common::common::{current_time, parse_query};
use redistracker::config::structs::config_watcher::ConfigWatcher;
use redistracker::config::structs::configuration::Configuration;
use redistracker::store::enums::store_engine::StoreEngine;
use redistracker::store::structs::store_connector::StoreConnector;
use redistracker::store::traits::store_backend::StoreBackend;
use redistracker::tracker::enums::swarm_class::SwarmClass;
use redistracker::tracker::structs::info_hash::InfoHash;
use redistracker::tracker::structs::peer_id::PeerId;
use redistracker::tracker::structs::torrent_peer::TorrentPeer;
use redistracker::tracker::structs::torrent_tracker::TorrentTracker;
use redistracker::utils::bonus::calculate_bonus;

fn random_info_hash() -> InfoHash {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: [u8; 20] = rng.random();
    InfoHash(bytes)
}

fn random_peer_id() -> PeerId {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: [u8; 20] = rng.random();
    PeerId(bytes)
}

fn create_test_peer(ip: IpAddr, port: u16, left: u64) -> TorrentPeer {
    let now = current_time();
    TorrentPeer {
        ip,
        port,
        user: None,
        uploaded: 0,
        downloaded: 0,
        left,
        seeding: left == 0,
        completed: false,
        session_start: now,
        last_announce: now,
    }
}

async fn create_tracker() -> Arc<TorrentTracker> {
    let mut config = Configuration::init();
    config.store.engine = StoreEngine::memory;
    let store = StoreConnector::new(&config.store).await.unwrap();
    Arc::new(TorrentTracker::new(Arc::new(ConfigWatcher::new(config)), store))
}

fn bench_upsert_peer(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let tracker = rt.block_on(create_tracker());
    let ttl = 3600;

    c.bench_function("upsert_peer", |b| {
        b.iter(|| {
            let info_hash = random_info_hash();
            let peer_id = random_peer_id();
            let peer = create_test_peer("127.0.0.1".parse().unwrap(), 6881, 1000);
            rt.block_on(async {
                black_box(tracker.store.upsert_peer(&info_hash, &peer_id, &peer, ttl).await.unwrap());
            });
        });
    });
}

fn bench_list_peers_with_limit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let tracker = rt.block_on(create_tracker());
    let info_hash = random_info_hash();

    // Pre-populate with 1000 seeders
    rt.block_on(async {
        for i in 0..1000u32 {
            let peer_id = random_peer_id();
            let ip: IpAddr = format!("10.0.{}.{}", i / 256, i % 256).parse().unwrap();
            let peer = create_test_peer(ip, 6881, 0);
            tracker.store.upsert_peer(&info_hash, &peer_id, &peer, 3600).await.unwrap();
            tracker.store.swarm_add(&info_hash, SwarmClass::Seeders, &peer_id).await.unwrap();
        }
    });

    let mut group = c.benchmark_group("list_peers_with_limit");
    let requester = random_peer_id();

    for limit in [10, 25, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(limit), limit, |b, &limit| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(
                        tracker
                            .list_peers(&info_hash, &requester, false, "127.0.0.1".parse().unwrap(), limit)
                            .await
                            .unwrap(),
                    );
                });
            });
        });
    }

    group.finish();
}

fn bench_announce_query_parsing(c: &mut Criterion) {
    let query = "info_hash=%aa%bb%cc%dd%ee%ff%00%11%22%33%44%55%66%77%88%99%aa%bb%cc%dd\
        &peer_id=-qB4650-123456789012&port=6881&uploaded=1024&downloaded=2048&left=4096\
        &compact=1&event=started&numwant=50";

    c.bench_function("parse_announce_query", |b| {
        b.iter(|| {
            black_box(parse_query(Some(query.to_string())).unwrap());
        });
    });
}

fn bench_bonus_calculation(c: &mut Criterion) {
    c.bench_function("calculate_bonus", |b| {
        b.iter(|| {
            black_box(calculate_bonus(
                black_box(86400),
                black_box(5_000_000_000),
                black_box(1.0),
            ));
        });
    });
}

criterion_group!(
    benches,
    bench_upsert_peer,
    bench_list_peers_with_limit,
    bench_announce_query_parsing,
    bench_bonus_calculation
);
criterion_main!(benches);
