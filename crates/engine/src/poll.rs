//! One poll cycle for one subscriber.

use crate::{AlertDispatcher, DedupStore, MonitorStats, SubscriberRegistry};
use giftwatch_core::SubscriberId;
use giftwatch_feeds::{FeedResult, GiftSource};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a completed poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub subscriber: SubscriberId,
    /// Gifts returned by the source
    pub fetched: usize,
    /// Threshold applied during this tick
    pub max_price: f64,
    /// Gifts strictly below the threshold
    pub matched: usize,
    /// Gifts dispatched (delivered or not)
    pub notified: usize,
    /// Dispatches that reported a failure
    pub failed_deliveries: usize,
    /// Cache size after eviction
    pub cache_size: usize,
    /// Whether the cache was cleared at the end of the tick
    pub evicted: bool,
}

/// Shared collaborators of every poll cycle.
pub struct Poller {
    source: Arc<dyn GiftSource>,
    dispatcher: Arc<dyn AlertDispatcher>,
    registry: Arc<SubscriberRegistry>,
    dedup: Arc<DedupStore>,
    stats: Arc<MonitorStats>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn GiftSource>,
        dispatcher: Arc<dyn AlertDispatcher>,
        registry: Arc<SubscriberRegistry>,
        dedup: Arc<DedupStore>,
        stats: Arc<MonitorStats>,
    ) -> Self {
        Self {
            source,
            dispatcher,
            registry,
            dedup,
            stats,
        }
    }

    /// Run one fetch, filter, dedup, dispatch cycle for `subscriber`.
    ///
    /// A source failure ends the cycle before the registry or the cache is
    /// touched. Dispatch failures are logged and the gift is still marked
    /// as seen.
    pub async fn poll(&self, subscriber: SubscriberId) -> FeedResult<TickReport> {
        self.stats.record_tick();
        debug!(subscriber = %subscriber, "Poll cycle started");

        let gifts = match self.source.fetch_listings().await {
            Ok(gifts) => gifts,
            Err(e) => {
                self.stats.record_fetch_failure();
                warn!(
                    subscriber = %subscriber,
                    error = %e,
                    transient = e.is_transient(),
                    "Failed to fetch listings, skipping tick"
                );
                return Err(e);
            }
        };

        // Read fresh so a settings change is honored even before a restart.
        let max_price = self.registry.max_price(subscriber);
        let cache = self.dedup.cache_for(subscriber);

        debug!(
            subscriber = %subscriber,
            fetched = gifts.len(),
            max_price = max_price,
            cache_size = cache.size(),
            "Listings fetched"
        );

        let fetched = gifts.len();
        let mut matched = 0;
        let mut notified = 0;
        let mut failed_deliveries = 0;

        for gift in gifts.iter().filter(|g| g.is_cheaper_than(max_price)) {
            matched += 1;

            if cache.has(&gift.id) {
                continue;
            }

            info!(
                subscriber = %subscriber,
                gift_id = %gift.id,
                model = %gift.model,
                price = gift.price,
                "New gift"
            );

            match self.dispatcher.notify(subscriber, gift).await {
                Ok(()) => self.stats.record_alert(),
                Err(e) => {
                    failed_deliveries += 1;
                    self.stats.record_delivery_failure();
                    error!(
                        subscriber = %subscriber,
                        gift_id = %gift.id,
                        error = %e,
                        "Failed to deliver alert"
                    );
                }
            }

            cache.add(gift.id.clone());
            notified += 1;
        }

        let evicted = cache.maybe_evict_all();
        if evicted {
            self.stats.record_eviction();
            info!(limit = cache.limit(), "Dedup cache cleared");
        }

        let report = TickReport {
            subscriber,
            fetched,
            max_price,
            matched,
            notified,
            failed_deliveries,
            cache_size: cache.size(),
            evicted,
        };

        debug!(
            subscriber = %subscriber,
            matched = report.matched,
            notified = report.notified,
            "Poll cycle finished"
        );

        Ok(report)
    }
}
