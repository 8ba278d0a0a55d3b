//! Marketplace gift listings.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque marketplace identifier of a listed gift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftId(CompactString);

impl GiftId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(CompactString::new(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for GiftId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GiftId {
    fn from(id: String) -> Self {
        Self(CompactString::from(id))
    }
}

impl From<i64> for GiftId {
    fn from(id: i64) -> Self {
        Self(compact_str::format_compact!("{}", id))
    }
}

/// One listed gift as returned by the marketplace.
///
/// Identity is [`Gift::id`]; two fetches may return the same id with
/// different field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    /// Marketplace identifier
    pub id: GiftId,
    /// Collection name (e.g. "Plush Pepe")
    pub name: String,
    /// Model variant
    pub model: String,
    /// Serial number within the collection
    pub gift_num: i64,
    /// Background variant (e.g. "Black (1.2%)")
    pub backdrop: String,
    /// Listing price in TON
    pub price: f64,
}

impl Gift {
    /// Create a gift with only id and price set, the rest empty.
    pub fn priced(id: impl Into<GiftId>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            model: String::new(),
            gift_num: 0,
            backdrop: String::new(),
            price,
        }
    }

    /// Strict price comparison used by subscriber thresholds.
    /// A gift priced exactly at the threshold does not qualify.
    #[inline]
    pub fn is_cheaper_than(&self, max_price: f64) -> bool {
        self.price < max_price
    }
}
