use std::net::SocketAddr;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use futures_util::future::try_join_all;
use log::{error, info, warn};
use parking_lot::deadlock;
use sentry::ClientInitGuard;
use tokio::runtime::Builder;
use tokio_shutdown::Shutdown;
use redistracker::common::common::{current_time, setup_logging};
use redistracker::config::structs::config_watcher::ConfigWatcher;
use redistracker::config::structs::configuration::Configuration;
use redistracker::geo::structs::geo_db::GeoDb;
use redistracker::http::http::{http_service, HttpServiceSettings};
use redistracker::stats::enums::stats_event::StatsEvent;
use redistracker::store::structs::store_connector::StoreConnector;
use redistracker::store::traits::store_backend::StoreBackend;
use redistracker::structs::Cli;
use redistracker::tracker::structs::torrent_tracker::TorrentTracker;
use redistracker::utils::sentry_tracing::capture_lifecycle;

#[tracing::instrument(level = "debug")]
fn main() -> std::io::Result<()>
{
    let args = Cli::parse();

    let config = match Configuration::load_from_file(&args.config, args.create_config) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            exit(101)
        }
    };

    setup_logging(&config);

    info!("{} - Version: {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    #[warn(unused_variables)]
    let _sentry_guard: ClientInitGuard;
    if config.sentry_config.enabled {
        _sentry_guard = sentry::init((config.sentry_config.dsn.clone(), sentry::ClientOptions {
            release: sentry::release_name!(),
            debug: config.sentry_config.debug,
            sample_rate: config.sentry_config.sample_rate,
            max_breadcrumbs: config.sentry_config.max_breadcrumbs,
            attach_stacktrace: config.sentry_config.attach_stacktrace,
            send_default_pii: config.sentry_config.send_default_pii,
            traces_sample_rate: config.sentry_config.traces_sample_rate,
            session_mode: sentry::SessionMode::Request,
            auto_session_tracking: true,
            ..Default::default()
        }));
    }

    Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let store = match StoreConnector::new(&config.store).await {
                Ok(store) => store,
                Err(error) => {
                    error!("[BOOT] Could not connect the {} store: {}", config.store.engine, error);
                    exit(101)
                }
            };
            if let Err(error) = store.ping().await {
                error!("[BOOT] Store did not answer a ping: {}", error);
                exit(101)
            }

            let watcher = Arc::new(ConfigWatcher::new(config));
            let tracker = Arc::new(TorrentTracker::new(watcher.clone(), store));

            let snapshot = watcher.load();
            if snapshot.geo.enabled {
                match GeoDb::load(&snapshot.geo.path) {
                    Ok(geo) => {
                        info!("[BOOT] Loaded {} geo ranges from {}", geo.len(), snapshot.geo.path);
                        tracker.set_geo(geo);
                    }
                    Err(error) => {
                        warn!("[BOOT] Could not load geo dataset {}: {}", snapshot.geo.path, error);
                    }
                }
            }

            match tracker.spawn_expiry_reconciler().await {
                Ok(true) => info!("[BOOT] Expiry reconciliation running"),
                Ok(false) => warn!("[BOOT] Store provides no expiration feed, counters rely on announces alone"),
                Err(error) => {
                    error!("[BOOT] Could not start expiry reconciliation: {}", error);
                    exit(101)
                }
            }

            capture_lifecycle("tracker started");

            let tokio_shutdown = Shutdown::new().expect("shutdown creation works on first call");

            let deadlocks_handler = tokio_shutdown.clone();
            tokio::spawn(async move {
                info!("[BOOT] Starting thread for deadlocks...");
                let mut interval = tokio::time::interval(Duration::from_secs(30));
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let deadlocks = deadlock::check_deadlock();
                            if !deadlocks.is_empty() {
                                info!("[DEADLOCK] Found {} deadlocks", deadlocks.len());
                                for (i, threads) in deadlocks.iter().enumerate() {
                                    info!("[DEADLOCK] #{i}");
                                    for t in threads {
                                        info!("[DEADLOCK] Thread ID: {:#?}", t.thread_id());
                                        info!("[DEADLOCK] {:#?}", t.backtrace());
                                        sentry::capture_message(&format!("{:#?}", t.backtrace()), sentry::Level::Error);
                                    }
                                }
                            }
                        }
                        _ = deadlocks_handler.handle() => {
                            info!("[BOOT] Shutting down thread for deadlocks...");
                            return;
                        }
                    }
                }
            });

            let mut http_futures = Vec::new();
            let mut server_handles = Vec::new();

            for http_server_object in &snapshot.http_server {
                if http_server_object.enabled {
                    let address: SocketAddr = match http_server_object.bind_address.parse() {
                        Ok(address) => address,
                        Err(error) => {
                            error!("[BOOT] Invalid bind address {}: {}", http_server_object.bind_address, error);
                            exit(1)
                        }
                    };

                    let (handle, future) = http_service(
                        address,
                        tracker.clone(),
                        HttpServiceSettings {
                            real_ip_header: http_server_object.real_ip.clone(),
                        },
                        http_server_object.keep_alive,
                        http_server_object.request_timeout,
                        http_server_object.disconnect_timeout,
                        http_server_object.threads,
                        (
                            http_server_object.ssl,
                            Some(http_server_object.ssl_key.clone()),
                            Some(http_server_object.ssl_cert.clone())
                        )
                    ).await;

                    server_handles.push(handle);
                    http_futures.push(future);
                }
            }

            if http_futures.is_empty() {
                error!("[BOOT] No HTTP listener enabled, nothing to serve");
                exit(1)
            }

            tokio::spawn(async move {
                let _ = try_join_all(http_futures).await;
            });

            let console_shutdown = tokio_shutdown.clone();
            let console_tracker = tracker.clone();
            let console_interval = snapshot.log_console_interval.max(1);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(console_interval));
                interval.tick().await;
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let stats = console_tracker.get_stats();
                            info!(
                                "[STATS] torrents: {} | announces: {} tcp4 / {} tcp6 | scrapes: {} tcp4 / {} tcp6 | expired peers: {} | inconsistencies: {}",
                                stats.torrents,
                                stats.tcp4_announces_handled,
                                stats.tcp6_announces_handled,
                                stats.tcp4_scrapes_handled,
                                stats.tcp6_scrapes_handled,
                                stats.peers_expired,
                                stats.inconsistencies
                            );
                            console_tracker.set_stats(StatsEvent::TimestampConsole, current_time() as i64);
                        }
                        _ = console_shutdown.handle() => {
                            return;
                        }
                    }
                }
            });

            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let reload_watcher = watcher.clone();
                let reload_tracker = tracker.clone();
                let reload_path = args.config.clone();
                tokio::spawn(async move {
                    let mut usr2 = match signal(SignalKind::user_defined2()) {
                        Ok(stream) => stream,
                        Err(error) => {
                            warn!("[RELOAD] Could not install SIGUSR2 handler: {}", error);
                            return;
                        }
                    };
                    while usr2.recv().await.is_some() {
                        match Configuration::load_from_file(&reload_path, false) {
                            Ok(fresh) => {
                                let geo_config = fresh.geo.clone();
                                reload_watcher.swap(fresh);
                                if geo_config.enabled {
                                    match GeoDb::load(&geo_config.path) {
                                        Ok(geo) => reload_tracker.set_geo(geo),
                                        Err(error) => warn!("[RELOAD] Keeping previous geo dataset: {}", error),
                                    }
                                } else {
                                    reload_tracker.set_geo(GeoDb::default());
                                }
                                info!("[RELOAD] Configuration reloaded from {}", reload_path);
                                capture_lifecycle("configuration reloaded");
                            }
                            Err(error) => {
                                error!("[RELOAD] Keeping previous configuration: {}", error);
                            }
                        }
                    }
                });
            }

            tokio_shutdown.handle().await;

            info!("[BOOT] Shutting down...");
            capture_lifecycle("tracker stopping");
            for handle in server_handles {
                handle.stop(true).await;
            }
            info!("[BOOT] Shutdown complete");

            Ok(())
        })
}
