//! Error types for engine operations.

use giftwatch_core::InvalidPrice;
use thiserror::Error;

/// Errors returned by subscriber commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid price: {0} (must be a finite number greater than 0)")]
    InvalidPrice(f64),
}

impl From<InvalidPrice> for EngineError {
    fn from(err: InvalidPrice) -> Self {
        EngineError::InvalidPrice(err.0)
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by an alert dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}
