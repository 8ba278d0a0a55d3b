//! Deduplication of already notified gifts.
//!
//! The cache grows monotonically and is cleared in full once it holds more
//! than `limit` ids. There are no per-entry timestamps, so right after a
//! clear, gifts still on the first listing page are notified once more.

use dashmap::{DashMap, DashSet};
use giftwatch_core::{GiftId, SubscriberId};
use std::sync::Arc;

/// Default number of ids kept before the cache is cleared.
pub const DEFAULT_CACHE_LIMIT: usize = 1000;

/// Set of gift ids that already triggered a notification.
#[derive(Debug)]
pub struct DedupCache {
    seen: DashSet<GiftId>,
    limit: usize,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_LIMIT)
    }
}

impl DedupCache {
    /// Create a cache that clears itself once it holds more than `limit` ids.
    pub fn new(limit: usize) -> Self {
        Self {
            seen: DashSet::new(),
            limit,
        }
    }

    /// Whether this gift was already notified.
    pub fn has(&self, id: &GiftId) -> bool {
        self.seen.contains(id)
    }

    /// Mark a gift as notified. Returns false if it was already present.
    pub fn add(&self, id: GiftId) -> bool {
        self.seen.insert(id)
    }

    pub fn size(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Clear the whole cache if it grew past the limit.
    /// Returns true if the cache was cleared.
    pub fn maybe_evict_all(&self) -> bool {
        if self.seen.len() > self.limit {
            self.seen.clear();
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        self.seen.clear();
    }
}

/// Which subscribers share a dedup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupScope {
    /// One cache for everyone: a gift is notified once, to whichever
    /// subscriber's tick sees it first.
    #[default]
    Shared,
    /// One cache per subscriber: every interested subscriber is notified.
    PerSubscriber,
}

impl std::str::FromStr for DedupScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "shared" => Ok(DedupScope::Shared),
            "per-subscriber" | "subscriber" => Ok(DedupScope::PerSubscriber),
            other => Err(format!("unknown dedup scope: {}", other)),
        }
    }
}

/// Hands out the dedup cache for a subscriber according to the scope.
#[derive(Debug)]
pub struct DedupStore {
    scope: DedupScope,
    limit: usize,
    shared: Arc<DedupCache>,
    per_subscriber: DashMap<SubscriberId, Arc<DedupCache>>,
}

impl DedupStore {
    pub fn new(scope: DedupScope, limit: usize) -> Self {
        Self {
            scope,
            limit,
            shared: Arc::new(DedupCache::new(limit)),
            per_subscriber: DashMap::new(),
        }
    }

    pub fn scope(&self) -> DedupScope {
        self.scope
    }

    /// Cache consulted by `subscriber`'s ticks.
    pub fn cache_for(&self, subscriber: SubscriberId) -> Arc<DedupCache> {
        match self.scope {
            DedupScope::Shared => Arc::clone(&self.shared),
            DedupScope::PerSubscriber => Arc::clone(
                self.per_subscriber
                    .entry(subscriber)
                    .or_insert_with(|| Arc::new(DedupCache::new(self.limit)))
                    .value(),
            ),
        }
    }

    /// Total number of ids held across all caches.
    pub fn total_size(&self) -> usize {
        match self.scope {
            DedupScope::Shared => self.shared.size(),
            DedupScope::PerSubscriber => self.per_subscriber.iter().map(|c| c.size()).sum(),
        }
    }
}
