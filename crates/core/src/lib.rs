//! Core data types for the gift watcher.

pub mod gift;
pub mod subscriber;

pub use gift::*;
pub use subscriber::*;
