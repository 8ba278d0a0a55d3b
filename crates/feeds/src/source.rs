//! Listing source abstraction.

use crate::{FeedError, FeedResult};
use async_trait::async_trait;
use giftwatch_core::Gift;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Provider of the current page of marketplace listings.
///
/// Implementations return listings sorted by ascending price. The query is
/// fixed per source; subscriber-specific filtering happens in the engine.
#[async_trait]
pub trait GiftSource: Send + Sync {
    /// Fetch the current page of listings.
    async fn fetch_listings(&self) -> FeedResult<Vec<Gift>>;
}

/// Mock listing source for testing.
#[derive(Default)]
pub struct MockGiftSource {
    listings: RwLock<Vec<Gift>>,
    /// When set, every fetch fails with this message.
    failure: RwLock<Option<String>>,
    calls: AtomicU64,
}

impl MockGiftSource {
    /// Create a source that always returns `listings`.
    pub fn new(listings: Vec<Gift>) -> Self {
        Self {
            listings: RwLock::new(listings),
            ..Default::default()
        }
    }

    /// Replace the listings returned by later fetches.
    pub fn set_listings(&self, listings: Vec<Gift>) {
        if let Ok(mut lock) = self.listings.write() {
            *lock = listings;
        }
    }

    /// Make later fetches fail (`Some`) or succeed again (`None`).
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut lock) = self.failure.write() {
            *lock = message.map(str::to_string);
        }
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GiftSource for MockGiftSource {
    async fn fetch_listings(&self) -> FeedResult<Vec<Gift>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.read().ok().and_then(|f| f.clone()) {
            return Err(FeedError::RequestFailed(message));
        }

        Ok(self
            .listings
            .read()
            .map(|l| l.clone())
            .unwrap_or_default())
    }
}
