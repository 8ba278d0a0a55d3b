//! Telegram bot handlers.

use crate::message::format_price;
use chrono::{DateTime, Utc};
use giftwatch_core::SubscriberId;
use giftwatch_engine::{GiftMonitor, StopOutcome};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("Invalid purchase link base: {0}")]
    InvalidLink(#[from] url::ParseError),
}

/// Bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start monitoring new gifts")]
    Start,
    #[command(description = "Stop monitoring")]
    Stop,
    #[command(description = "Show or set the max price. Usage: /price 3.5")]
    Price(String),
    #[command(description = "Show monitoring status")]
    Status,
    #[command(description = "Show help")]
    Help,
}

const INVALID_PRICE_REPLY: &str = "❌ Please provide a valid price greater than 0";

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
    monitor: Arc<GiftMonitor>,
    started_at: DateTime<Utc>,
}

impl TelegramBot {
    pub fn new(bot: Bot, monitor: Arc<GiftMonitor>) -> Self {
        Self {
            bot,
            monitor,
            started_at: Utc::now(),
        }
    }

    /// Get the underlying bot for sending messages.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn monitor(&self) -> &GiftMonitor {
        &self.monitor
    }

    /// Run the bot command handler until Ctrl-C.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();

        if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "Failed to register bot commands");
        }

        let handler = Update::filter_message().filter_command::<Command>().endpoint(
            move |bot: Bot, msg: Message, cmd: Command| {
                let this = Arc::clone(&self);
                async move { this.handle_command(bot, msg, cmd).await }
            },
        );

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_command(
        &self,
        bot: Bot,
        msg: Message,
        cmd: Command,
    ) -> Result<(), TelegramError> {
        let chat = SubscriberId(msg.chat.id.0);
        info!(chat = %chat, command = ?cmd, "Command received");

        let text = self.reply(chat, cmd);
        bot.send_message(msg.chat.id, text).await?;
        Ok(())
    }

    /// Apply `cmd` for `chat` and render the reply.
    pub fn reply(&self, chat: SubscriberId, cmd: Command) -> String {
        match cmd {
            Command::Start => {
                let (subscriber, _) = self.monitor.start_monitoring(chat);
                format!(
                    "🤖 Monitoring started!\n\n\
                     📊 Current settings:\n\
                     💰 Max price: {}\n\n\
                     Commands:\n\
                     /price <price> - set the max price\n\
                     /stop - stop monitoring",
                    format_price(subscriber.max_price)
                )
            }

            Command::Stop => match self.monitor.stop_monitoring(chat) {
                StopOutcome::Stopped => "🛑 Monitoring stopped".to_string(),
                StopOutcome::NotRunning => "❌ Monitoring is already stopped".to_string(),
            },

            Command::Price(value) => {
                let value = value.trim();
                if value.is_empty() {
                    return format!(
                        "📊 Current max price: {}\n\n\
                         To change it, use:\n\
                         /price <new price>",
                        format_price(self.monitor.get_price(chat))
                    );
                }

                let Ok(price) = value.parse::<f64>() else {
                    return INVALID_PRICE_REPLY.to_string();
                };

                match self.monitor.set_price(chat, price) {
                    Ok(subscriber) => format!(
                        "✅ Max price set: {price}\n\n\
                         You will be notified about gifts cheaper than {price}",
                        price = format_price(subscriber.max_price)
                    ),
                    Err(_) => INVALID_PRICE_REPLY.to_string(),
                }
            }

            Command::Status => {
                let snapshot = self.monitor.snapshot();
                let state = if self.monitor.is_monitoring(chat) {
                    "active"
                } else {
                    "stopped"
                };
                format!(
                    "📡 Monitoring: {}\n\
                     💰 Max price: {}\n\
                     👥 Active sessions: {}\n\
                     🗂 Cached gifts: {}\n\
                     ⏱ Up since: {}",
                    state,
                    format_price(self.monitor.get_price(chat)),
                    snapshot.active_sessions,
                    snapshot.cache_size,
                    self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }

            Command::Help => Command::descriptions().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftwatch_engine::{MonitorConfig, RecordingDispatcher};
    use giftwatch_feeds::MockGiftSource;
    use pretty_assertions::assert_eq;

    const CHAT: SubscriberId = SubscriberId(555);

    fn telegram_bot() -> TelegramBot {
        let monitor = GiftMonitor::new(
            MonitorConfig::default(),
            Arc::new(MockGiftSource::new(Vec::new())),
            Arc::new(RecordingDispatcher::new()),
        );
        TelegramBot::new(Bot::new("123456:TEST"), Arc::new(monitor))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "giftwatch_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/stop", "giftwatch_bot").unwrap(), Command::Stop);
        assert_eq!(
            Command::parse("/price 2.5", "giftwatch_bot").unwrap(),
            Command::Price("2.5".to_string())
        );
        assert!(Command::parse("/unknown", "giftwatch_bot").is_err());
    }

    #[test]
    fn test_help_lists_commands() {
        let help = Command::descriptions().to_string();
        for command in ["/start", "/stop", "/price", "/status", "/help"] {
            assert!(help.contains(command), "missing {}", command);
        }
    }

    #[tokio::test]
    async fn test_start_then_stop() {
        let bot = telegram_bot();

        let reply = bot.reply(CHAT, Command::Start);
        assert!(reply.contains("Max price: 4 TON"));
        assert!(bot.monitor().is_monitoring(CHAT));

        assert_eq!(bot.reply(CHAT, Command::Stop), "🛑 Monitoring stopped");
        assert_eq!(
            bot.reply(CHAT, Command::Stop),
            "❌ Monitoring is already stopped"
        );
    }

    #[tokio::test]
    async fn test_price_show_and_set() {
        let bot = telegram_bot();

        let reply = bot.reply(CHAT, Command::Price(String::new()));
        assert!(reply.starts_with("📊 Current max price: 4 TON"));

        let reply = bot.reply(CHAT, Command::Price(" 2.5 ".to_string()));
        assert!(reply.starts_with("✅ Max price set: 2.5 TON"));
        assert_eq!(bot.monitor().get_price(CHAT), 2.5);
    }

    #[tokio::test]
    async fn test_price_rejects_bad_input() {
        let bot = telegram_bot();

        for input in ["abc", "-1", "0", "NaN", "inf"] {
            assert_eq!(
                bot.reply(CHAT, Command::Price(input.to_string())),
                INVALID_PRICE_REPLY
            );
        }
        assert_eq!(bot.monitor().get_price(CHAT), 4.0);
    }

    #[tokio::test]
    async fn test_status() {
        let bot = telegram_bot();

        assert!(bot.reply(CHAT, Command::Status).starts_with("📡 Monitoring: stopped"));
        assert!(bot
            .reply(CHAT, Command::Price(String::new()))
            .contains("4 TON"));
        assert_eq!(bot.monitor().snapshot().subscribers, 0);

        bot.reply(CHAT, Command::Start);
        let status = bot.reply(CHAT, Command::Status);
        assert!(status.starts_with("📡 Monitoring: active"));
        assert!(status.contains("Active sessions: 1"));
    }
}
