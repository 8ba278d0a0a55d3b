//! Engine counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic counters updated by poll cycles.
#[derive(Debug)]
pub struct MonitorStats {
    pub ticks: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub alerts_sent: AtomicU64,
    pub delivery_failures: AtomicU64,
    pub cache_evictions: AtomicU64,
    started_at: Instant,
}

impl Default for MonitorStats {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorStats {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            alerts_sent: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            cache_evictions: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert(&self) {
        self.alerts_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            ticks: self.ticks.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            alerts_sent: self.alerts_sent.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            cache_evictions: self.cache_evictions.load(Ordering::Relaxed),
            uptime_secs: self.uptime_secs(),
        }
    }
}

/// Point-in-time copy of [`MonitorStats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub ticks: u64,
    pub fetch_failures: u64,
    pub alerts_sent: u64,
    pub delivery_failures: u64,
    pub cache_evictions: u64,
    pub uptime_secs: u64,
}
