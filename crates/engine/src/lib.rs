//! Gift monitoring engine.
//!
//! This crate owns the per-subscriber polling lifecycle: fetching listings,
//! filtering them by each subscriber's price threshold, deduplicating
//! against already notified gifts, and dispatching alerts.

pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod poll;
pub mod registry;
pub mod scheduler;
pub mod stats;

pub use dedup::*;
pub use dispatch::*;
pub use error::*;
pub use monitor::*;
pub use poll::*;
pub use registry::*;
pub use scheduler::*;
pub use stats::*;
