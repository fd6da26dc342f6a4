use std::sync::atomic::AtomicI64;
use crate::common::common::current_time;

/// Per-process activity counters.
#[derive(Debug)]
pub struct StatsAtomics {
    pub started: AtomicI64,
    pub timestamp_run_console: AtomicI64,
    pub torrents: AtomicI64,
    pub tcp4_connections_handled: AtomicI64,
    pub tcp4_announces_handled: AtomicI64,
    pub tcp4_scrapes_handled: AtomicI64,
    pub tcp4_not_found: AtomicI64,
    pub tcp4_failure: AtomicI64,
    pub tcp6_connections_handled: AtomicI64,
    pub tcp6_announces_handled: AtomicI64,
    pub tcp6_scrapes_handled: AtomicI64,
    pub tcp6_not_found: AtomicI64,
    pub tcp6_failure: AtomicI64,
    pub peers_expired: AtomicI64,
    pub inconsistencies: AtomicI64,
}

impl StatsAtomics {
    pub fn new() -> StatsAtomics {
        StatsAtomics {
            started: AtomicI64::new(current_time() as i64),
            timestamp_run_console: AtomicI64::new(0),
            torrents: AtomicI64::new(0),
            tcp4_connections_handled: AtomicI64::new(0),
            tcp4_announces_handled: AtomicI64::new(0),
            tcp4_scrapes_handled: AtomicI64::new(0),
            tcp4_not_found: AtomicI64::new(0),
            tcp4_failure: AtomicI64::new(0),
            tcp6_connections_handled: AtomicI64::new(0),
            tcp6_announces_handled: AtomicI64::new(0),
            tcp6_scrapes_handled: AtomicI64::new(0),
            tcp6_not_found: AtomicI64::new(0),
            tcp6_failure: AtomicI64::new(0),
            peers_expired: AtomicI64::new(0),
            inconsistencies: AtomicI64::new(0),
        }
    }
}

impl Default for StatsAtomics {
    fn default() -> Self {
        Self::new()
    }
}
