//! Command facade used by the chat front end.

use crate::{
    AlertDispatcher, DedupScope, DedupStore, EngineResult, MonitorScheduler, MonitorStats, Poller,
    StartOutcome, StatsSummary, StopOutcome, SubscriberRegistry, TickReport, DEFAULT_CACHE_LIMIT,
    DEFAULT_POLL_INTERVAL,
};
use giftwatch_core::{Subscriber, SubscriberId, DEFAULT_MAX_PRICE};
use giftwatch_feeds::{FeedResult, GiftSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Delay between two polls of one subscriber
    pub poll_interval: Duration,
    /// Cache size above which the dedup cache is cleared
    pub cache_limit: usize,
    /// Threshold given to new subscribers (TON)
    pub default_max_price: f64,
    pub dedup_scope: DedupScope,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            cache_limit: DEFAULT_CACHE_LIMIT,
            default_max_price: DEFAULT_MAX_PRICE,
            dedup_scope: DedupScope::Shared,
        }
    }
}

/// Engine state as shown by `/status` and the stats reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSnapshot {
    pub subscribers: usize,
    pub active_sessions: usize,
    pub cache_size: usize,
    pub stats: StatsSummary,
}

/// Entry point for the subscriber commands.
pub struct GiftMonitor {
    config: MonitorConfig,
    registry: Arc<SubscriberRegistry>,
    dedup: Arc<DedupStore>,
    stats: Arc<MonitorStats>,
    poller: Arc<Poller>,
    scheduler: MonitorScheduler,
}

impl GiftMonitor {
    pub fn new(
        config: MonitorConfig,
        source: Arc<dyn GiftSource>,
        dispatcher: Arc<dyn AlertDispatcher>,
    ) -> Self {
        let registry = Arc::new(SubscriberRegistry::new(config.default_max_price));
        let dedup = Arc::new(DedupStore::new(config.dedup_scope, config.cache_limit));
        let stats = Arc::new(MonitorStats::new());
        let poller = Arc::new(Poller::new(
            source,
            dispatcher,
            registry.clone(),
            dedup.clone(),
            stats.clone(),
        ));
        let scheduler = MonitorScheduler::new(poller.clone(), config.poll_interval);

        info!(
            interval_secs = config.poll_interval.as_secs(),
            cache_limit = config.cache_limit,
            default_max_price = config.default_max_price,
            dedup_scope = ?config.dedup_scope,
            "Gift monitor created"
        );

        Self {
            config,
            registry,
            dedup,
            stats,
            poller,
            scheduler,
        }
    }

    /// Register `id` if needed and (re)start its session.
    pub fn start_monitoring(&self, id: SubscriberId) -> (Subscriber, StartOutcome) {
        let subscriber = self.registry.get_or_create(id);
        let outcome = self.scheduler.start(id);
        (subscriber, outcome)
    }

    /// Stop the session for `id`. Settings are kept.
    pub fn stop_monitoring(&self, id: SubscriberId) -> StopOutcome {
        self.scheduler.stop(id)
    }

    /// Current threshold for `id`. Does not register unknown subscribers.
    pub fn get_price(&self, id: SubscriberId) -> f64 {
        self.registry.max_price(id)
    }

    /// Update the threshold for `id` and restart its session if running.
    ///
    /// An invalid price leaves both settings and session untouched.
    pub fn set_price(&self, id: SubscriberId, price: f64) -> EngineResult<Subscriber> {
        let subscriber = self.registry.set_max_price(id, price)?;
        let restarted = self.scheduler.restart(id);
        info!(
            subscriber = %id,
            max_price = subscriber.max_price,
            restarted = restarted,
            "Price threshold updated"
        );
        Ok(subscriber)
    }

    pub fn is_monitoring(&self, id: SubscriberId) -> bool {
        self.scheduler.is_running(id)
    }

    /// Run one poll cycle for `id` immediately, outside its timer.
    pub async fn poll_now(&self, id: SubscriberId) -> FeedResult<TickReport> {
        self.poller.poll(id).await
    }

    /// Stop every session. Returns how many were running.
    pub fn shutdown(&self) -> usize {
        self.scheduler.stop_all()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            subscribers: self.registry.len(),
            active_sessions: self.scheduler.active_sessions(),
            cache_size: self.dedup.total_size(),
            stats: self.stats.summary(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    pub fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }
}
