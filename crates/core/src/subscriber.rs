//! Subscriber identity and settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default price threshold in TON for a new subscriber.
pub const DEFAULT_MAX_PRICE: f64 = 4.0;

/// Addressable notification recipient (a Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("price must be a finite number greater than 0, got {0}")]
pub struct InvalidPrice(pub f64);

/// Validate a user supplied price threshold.
pub fn validate_price(price: f64) -> Result<f64, InvalidPrice> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(InvalidPrice(price))
    }
}

/// Per-subscriber settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    /// Gifts strictly cheaper than this (TON) are reported.
    pub max_price: f64,
}

impl Subscriber {
    /// Create a subscriber with the default threshold.
    pub fn new(id: SubscriberId) -> Self {
        Self::with_max_price(id, DEFAULT_MAX_PRICE)
    }

    pub fn with_max_price(id: SubscriberId, max_price: f64) -> Self {
        Self { id, max_price }
    }
}
