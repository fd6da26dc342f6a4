use serde::Serialize;

/// A point-in-time snapshot of the atomic counters.
#[derive(Serialize, Clone, Copy, Debug)]
pub struct Stats {
    pub started: i64,
    pub timestamp_run_console: i64,
    pub torrents: i64,
    pub tcp4_connections_handled: i64,
    pub tcp4_announces_handled: i64,
    pub tcp4_scrapes_handled: i64,
    pub tcp4_not_found: i64,
    pub tcp4_failure: i64,
    pub tcp6_connections_handled: i64,
    pub tcp6_announces_handled: i64,
    pub tcp6_scrapes_handled: i64,
    pub tcp6_not_found: i64,
    pub tcp6_failure: i64,
    pub peers_expired: i64,
    pub inconsistencies: i64,
}
