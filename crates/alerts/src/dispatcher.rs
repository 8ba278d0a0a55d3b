//! Alert delivery through the Telegram Bot API.

use crate::message::{format_gift_alert, purchase_keyboard};
use crate::{AlertsConfig, TelegramError};
use async_trait::async_trait;
use giftwatch_core::{Gift, SubscriberId};
use giftwatch_engine::{AlertDispatcher, DispatchError};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::debug;
use url::Url;

/// Sends gift alerts as HTML messages with a purchase button.
#[derive(Clone)]
pub struct TelegramDispatcher {
    bot: Bot,
    link_base: Url,
}

impl TelegramDispatcher {
    pub fn new(bot: Bot, link_base: Url) -> Self {
        Self { bot, link_base }
    }

    /// Create a bot client from the token and link settings.
    pub fn from_config(config: &AlertsConfig) -> Result<Self, TelegramError> {
        Ok(Self::new(Bot::new(&config.bot_token), config.link_base()?))
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl AlertDispatcher for TelegramDispatcher {
    async fn notify(&self, subscriber: SubscriberId, gift: &Gift) -> Result<(), DispatchError> {
        self.bot
            .send_message(ChatId(subscriber.0), format_gift_alert(gift))
            .parse_mode(ParseMode::Html)
            .reply_markup(purchase_keyboard(&self.link_base, &gift.id))
            .await
            .map_err(|e| DispatchError::DeliveryFailed(e.to_string()))?;

        debug!(subscriber = %subscriber, gift_id = %gift.id, "Alert delivered");
        Ok(())
    }
}
