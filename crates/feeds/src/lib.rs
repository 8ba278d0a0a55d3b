//! Marketplace listing feeds.
//!
//! - `source` - the [`GiftSource`] trait consumed by the monitoring engine
//! - `tonnel` - REST client for the Tonnel gift marketplace
//! - `error` - feed error type

pub mod error;
pub mod source;
pub mod tonnel;

pub use error::*;
pub use source::*;
pub use tonnel::*;
