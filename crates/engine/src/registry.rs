//! Subscriber settings registry.

use crate::EngineResult;
use dashmap::DashMap;
use giftwatch_core::{validate_price, Subscriber, SubscriberId, DEFAULT_MAX_PRICE};

/// In-memory mapping from subscriber to its settings.
///
/// Subscribers are never removed. The registry knows nothing about
/// monitoring sessions; callers restart a session after changing settings.
#[derive(Debug)]
pub struct SubscriberRegistry {
    subscribers: DashMap<SubscriberId, Subscriber>,
    default_max_price: f64,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PRICE)
    }
}

impl SubscriberRegistry {
    /// Create a registry that gives new subscribers `default_max_price`.
    pub fn new(default_max_price: f64) -> Self {
        Self {
            subscribers: DashMap::new(),
            default_max_price,
        }
    }

    /// Return existing settings or register the subscriber with defaults.
    pub fn get_or_create(&self, id: SubscriberId) -> Subscriber {
        *self
            .subscribers
            .entry(id)
            .or_insert_with(|| Subscriber::with_max_price(id, self.default_max_price))
            .value()
    }

    /// Overwrite the price threshold, registering the subscriber if needed.
    /// Invalid prices leave the previous settings untouched.
    pub fn set_max_price(&self, id: SubscriberId, price: f64) -> EngineResult<Subscriber> {
        let price = validate_price(price)?;

        let mut entry = self
            .subscribers
            .entry(id)
            .or_insert_with(|| Subscriber::with_max_price(id, self.default_max_price));
        entry.max_price = price;
        Ok(*entry.value())
    }

    /// Current threshold, read fresh on every call.
    pub fn max_price(&self, id: SubscriberId) -> f64 {
        self.subscribers
            .get(&id)
            .map(|s| s.max_price)
            .unwrap_or(self.default_max_price)
    }

    pub fn get(&self, id: SubscriberId) -> Option<Subscriber> {
        self.subscribers.get(&id).map(|s| *s.value())
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn default_max_price(&self) -> f64 {
        self.default_max_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_or_create_uses_default() {
        let registry = SubscriberRegistry::default();
        let sub = registry.get_or_create(SubscriberId(7));

        assert_eq!(sub, Subscriber::with_max_price(SubscriberId(7), 4.0));
        assert!(registry.contains(SubscriberId(7)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_or_create_keeps_existing() {
        let registry = SubscriberRegistry::default();
        registry.set_max_price(SubscriberId(7), 2.5).unwrap();

        assert_eq!(registry.get_or_create(SubscriberId(7)).max_price, 2.5);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_max_price_registers_unknown_subscriber() {
        let registry = SubscriberRegistry::new(10.0);
        let sub = registry.set_max_price(SubscriberId(1), 3.0).unwrap();

        assert_eq!(sub, Subscriber::with_max_price(SubscriberId(1), 3.0));
        assert_eq!(registry.max_price(SubscriberId(1)), 3.0);
    }

    #[test]
    fn test_invalid_prices_leave_settings_unchanged() {
        let registry = SubscriberRegistry::default();
        registry.set_max_price(SubscriberId(1), 6.0).unwrap();

        assert_eq!(
            registry.set_max_price(SubscriberId(1), -1.0),
            Err(EngineError::InvalidPrice(-1.0))
        );
        assert!(matches!(
            registry.set_max_price(SubscriberId(1), f64::NAN),
            Err(EngineError::InvalidPrice(_))
        ));
        assert!(registry.set_max_price(SubscriberId(1), 0.0).is_err());
        assert!(registry.set_max_price(SubscriberId(1), f64::INFINITY).is_err());

        assert_eq!(registry.max_price(SubscriberId(1)), 6.0);
    }

    #[test]
    fn test_invalid_price_does_not_register() {
        let registry = SubscriberRegistry::default();
        assert!(registry.set_max_price(SubscriberId(9), -5.0).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_max_price_of_unknown_subscriber_is_default() {
        let registry = SubscriberRegistry::new(4.0);
        assert_eq!(registry.max_price(SubscriberId(99)), 4.0);
        assert!(registry.get(SubscriberId(99)).is_none());
    }
}
