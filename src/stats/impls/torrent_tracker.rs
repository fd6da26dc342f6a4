use std::sync::atomic::Ordering;
use crate::stats::enums::stats_event::StatsEvent;
use crate::stats::structs::stats::Stats;
use crate::tracker::structs::torrent_tracker::TorrentTracker;

impl TorrentTracker {
    pub fn get_stats(&self) -> Stats {
        Stats {
            started: self.stats.started.load(Ordering::SeqCst),
            timestamp_run_console: self.stats.timestamp_run_console.load(Ordering::SeqCst),
            torrents: self.stats.torrents.load(Ordering::SeqCst),
            tcp4_connections_handled: self.stats.tcp4_connections_handled.load(Ordering::SeqCst),
            tcp4_announces_handled: self.stats.tcp4_announces_handled.load(Ordering::SeqCst),
            tcp4_scrapes_handled: self.stats.tcp4_scrapes_handled.load(Ordering::SeqCst),
            tcp4_not_found: self.stats.tcp4_not_found.load(Ordering::SeqCst),
            tcp4_failure: self.stats.tcp4_failure.load(Ordering::SeqCst),
            tcp6_connections_handled: self.stats.tcp6_connections_handled.load(Ordering::SeqCst),
            tcp6_announces_handled: self.stats.tcp6_announces_handled.load(Ordering::SeqCst),
            tcp6_scrapes_handled: self.stats.tcp6_scrapes_handled.load(Ordering::SeqCst),
            tcp6_not_found: self.stats.tcp6_not_found.load(Ordering::SeqCst),
            tcp6_failure: self.stats.tcp6_failure.load(Ordering::SeqCst),
            peers_expired: self.stats.peers_expired.load(Ordering::SeqCst),
            inconsistencies: self.stats.inconsistencies.load(Ordering::SeqCst),
        }
    }

    fn counter(&self, event: StatsEvent) -> &std::sync::atomic::AtomicI64 {
        match event {
            StatsEvent::Torrents => &self.stats.torrents,
            StatsEvent::TimestampConsole => &self.stats.timestamp_run_console,
            StatsEvent::Tcp4ConnectionsHandled => &self.stats.tcp4_connections_handled,
            StatsEvent::Tcp4AnnouncesHandled => &self.stats.tcp4_announces_handled,
            StatsEvent::Tcp4ScrapesHandled => &self.stats.tcp4_scrapes_handled,
            StatsEvent::Tcp4NotFound => &self.stats.tcp4_not_found,
            StatsEvent::Tcp4Failure => &self.stats.tcp4_failure,
            StatsEvent::Tcp6ConnectionsHandled => &self.stats.tcp6_connections_handled,
            StatsEvent::Tcp6AnnouncesHandled => &self.stats.tcp6_announces_handled,
            StatsEvent::Tcp6ScrapesHandled => &self.stats.tcp6_scrapes_handled,
            StatsEvent::Tcp6NotFound => &self.stats.tcp6_not_found,
            StatsEvent::Tcp6Failure => &self.stats.tcp6_failure,
            StatsEvent::PeersExpired => &self.stats.peers_expired,
            StatsEvent::Inconsistencies => &self.stats.inconsistencies,
        }
    }

    pub fn update_stats(&self, event: StatsEvent, value: i64) {
        let counter = self.counter(event);
        if value > 0 {
            counter.fetch_add(value, Ordering::SeqCst);
        }
        if value < 0 {
            counter.fetch_sub(-value, Ordering::SeqCst);
        }
    }

    pub fn set_stats(&self, event: StatsEvent, value: i64) {
        self.counter(event).store(value, Ordering::SeqCst);
    }
}
