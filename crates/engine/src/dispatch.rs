//! Alert dispatch boundary.

use crate::DispatchError;
use async_trait::async_trait;
use giftwatch_core::{Gift, GiftId, SubscriberId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Sends one gift notification to one subscriber.
///
/// Delivery is best effort: the engine logs failures and never retries.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn notify(&self, subscriber: SubscriberId, gift: &Gift) -> Result<(), DispatchError>;
}

/// Dispatcher that records deliveries, for testing.
#[derive(Default)]
pub struct RecordingDispatcher {
    delivered: Mutex<Vec<(SubscriberId, GiftId)>>,
    attempts: AtomicU64,
    failing: AtomicBool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All successful deliveries in order.
    pub fn delivered(&self) -> Vec<(SubscriberId, GiftId)> {
        self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Gift ids delivered to one subscriber, in order.
    pub fn delivered_to(&self, subscriber: SubscriberId) -> Vec<String> {
        self.delivered()
            .into_iter()
            .filter(|(s, _)| *s == subscriber)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    /// Number of notify calls, including failed ones.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertDispatcher for RecordingDispatcher {
    async fn notify(&self, subscriber: SubscriberId, gift: &Gift) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(DispatchError::DeliveryFailed("mock failure".to_string()));
        }

        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push((subscriber, gift.id.clone()));
        }
        Ok(())
    }
}
