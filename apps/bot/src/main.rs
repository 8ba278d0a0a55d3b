//! Giftwatch - Telegram gift listing monitor
//!
//! Polls the Tonnel gift marketplace for every subscribed chat and sends one
//! alert per newly listed gift below the chat's price threshold.

mod config;

use clap::Parser;
use config::AppConfig;
use giftwatch_alerts::{TelegramBot, TelegramDispatcher};
use giftwatch_engine::{GiftMonitor, MonitorSnapshot};
use giftwatch_feeds::{GiftSource, TonnelClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const STATS_INTERVAL: Duration = Duration::from_secs(60);

/// Giftwatch CLI
#[derive(Parser, Debug)]
#[command(name = "giftwatch")]
#[command(about = "Telegram alerts for cheap gift listings", long_about = None)]
struct Args {
    /// Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Seconds between two polls of one subscriber
    #[arg(long, default_value_t = 20)]
    poll_interval_secs: u64,

    /// Dedup cache size above which it is cleared
    #[arg(long, default_value_t = 1000)]
    cache_limit: usize,

    /// Price threshold (TON) for new subscribers
    #[arg(long, default_value_t = 4.0)]
    default_max_price: f64,

    /// Dedup scope: shared, per-subscriber
    #[arg(long, default_value = "shared")]
    dedup_scope: String,

    /// Marketplace request timeout in seconds
    #[arg(long, default_value_t = 15)]
    request_timeout_secs: u64,

    /// Marketplace API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Purchase link base; the gift id is appended as `startapp`
    #[arg(long)]
    purchase_link_base: Option<String>,

    /// Fetch listings once, print them and exit
    #[arg(long, default_value_t = false)]
    probe: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// One fetch against the marketplace, logged gift by gift.
async fn run_probe(source: &dyn GiftSource, max_price: f64) {
    info!("🚀 Running probe request");

    let gifts = match source.fetch_listings().await {
        Ok(gifts) => gifts,
        Err(e) => {
            error!(error = %e, "❌ Probe request failed");
            return;
        }
    };

    if gifts.is_empty() {
        info!("😔 No listings returned");
        return;
    }

    let cheaper = gifts.iter().filter(|g| g.is_cheaper_than(max_price)).count();
    info!(
        total = gifts.len(),
        cheaper = cheaper,
        max_price = max_price,
        "📦 Listings received"
    );

    for gift in &gifts {
        info!(
            gift_id = %gift.id,
            name = %gift.name,
            model = %gift.model,
            gift_num = gift.gift_num,
            backdrop = %gift.backdrop,
            price = gift.price,
            below_threshold = gift.is_cheaper_than(max_price),
            "Listing"
        );
    }
}

fn log_snapshot(label: &str, snapshot: &MonitorSnapshot) {
    info!(
        "{} | Uptime: {}s | Sessions: {} | Subscribers: {} | Cache: {} | Ticks: {} | Fetch failures: {} | Alerts: {} | Delivery failures: {} | Evictions: {}",
        label,
        snapshot.stats.uptime_secs,
        snapshot.active_sessions,
        snapshot.subscribers,
        snapshot.cache_size,
        snapshot.stats.ticks,
        snapshot.stats.fetch_failures,
        snapshot.stats.alerts_sent,
        snapshot.stats.delivery_failures,
        snapshot.stats.cache_evictions
    );
}

async fn run_stats_reporter(monitor: Arc<GiftMonitor>, every: Duration) {
    info!("Starting stats reporter");

    let mut ticker = interval_at(Instant::now() + every, every);
    loop {
        ticker.tick().await;
        log_snapshot("📊 Stats", &monitor.snapshot());
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    init_logging(&args.log_level);

    let config = match AppConfig::from_args(&args, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return;
        }
    };

    info!("🚀 Giftwatch starting...");
    info!("  Poll interval: {}s", config.monitor.poll_interval.as_secs());
    info!("  Default max price: {} TON", config.monitor.default_max_price);
    info!("  Cache limit: {}", config.monitor.cache_limit);
    info!("  Dedup scope: {:?}", config.monitor.dedup_scope);
    info!("  Marketplace: {}", config.tonnel.base_url);

    if !config.has_user_auth() {
        warn!("{} is not set, requests are sent without a credential", config::USER_AUTH_VAR);
    }

    let client = match TonnelClient::new(config.tonnel.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create marketplace client: {}", e);
            return;
        }
    };

    if config.probe {
        run_probe(&client, config.monitor.default_max_price).await;
        return;
    }

    let Some(alerts) = config.alerts.as_ref() else {
        error!("Telegram settings missing");
        return;
    };

    let dispatcher = match TelegramDispatcher::from_config(alerts) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Failed to create Telegram client: {}", e);
            return;
        }
    };

    let monitor = Arc::new(GiftMonitor::new(
        config.monitor.clone(),
        Arc::new(client),
        Arc::new(dispatcher.clone()),
    ));

    let stats_monitor = monitor.clone();
    let stats_handle = tokio::spawn(async move {
        run_stats_reporter(stats_monitor, STATS_INTERVAL).await;
    });

    let telegram = Arc::new(TelegramBot::new(dispatcher.bot().clone(), monitor.clone()));

    // The dispatcher returns once Ctrl+C is received.
    info!("Press Ctrl+C to stop...");
    telegram.run().await;

    warn!("Shutdown signal received");
    let stopped = monitor.shutdown();
    info!("  Sessions stopped: {}", stopped);

    stats_handle.abort();

    log_snapshot("📈 Final Stats", &monitor.snapshot());
    info!("👋 Giftwatch stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftwatch_core::Gift;
    use giftwatch_feeds::MockGiftSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["giftwatch"]);
        assert_eq!(args.log_level, "info");
        assert_eq!(args.poll_interval_secs, 20);
        assert_eq!(args.cache_limit, 1000);
        assert_eq!(args.default_max_price, 4.0);
        assert_eq!(args.dedup_scope, "shared");
        assert!(!args.probe);
    }

    #[tokio::test]
    async fn test_probe_fetches_once() {
        let source = MockGiftSource::new(vec![Gift::priced("g1", 1.0), Gift::priced("g2", 9.0)]);
        run_probe(&source, 4.0).await;
        assert_eq!(source.calls(), 1);
    }
}
