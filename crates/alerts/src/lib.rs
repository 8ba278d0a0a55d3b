//! Telegram front end for the gift monitor.
//!
//! This crate provides:
//! - Alert message rendering with a purchase button
//! - An `AlertDispatcher` that delivers alerts through the Bot API
//! - The command bot (`/start`, `/stop`, `/price`, `/status`, `/help`)

pub mod config;
pub mod dispatcher;
pub mod message;
pub mod telegram;

pub use config::{AlertsConfig, DEFAULT_PURCHASE_LINK_BASE};
pub use dispatcher::TelegramDispatcher;
pub use message::{format_gift_alert, format_price, purchase_keyboard, purchase_link};
pub use telegram::{Command, TelegramBot, TelegramError};
