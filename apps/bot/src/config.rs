//! Application configuration.

use crate::Args;
use giftwatch_alerts::AlertsConfig;
use giftwatch_core::validate_price;
use giftwatch_engine::{DedupScope, MonitorConfig};
use giftwatch_feeds::TonnelConfig;
use std::time::Duration;
use thiserror::Error;

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const USER_AUTH_VAR: &str = "USER_AUTH";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub tonnel: TonnelConfig,
    /// Absent in probe mode.
    pub alerts: Option<AlertsConfig>,
    pub probe: bool,
}

impl AppConfig {
    /// Build the configuration from CLI arguments and an environment lookup.
    pub fn from_args<F>(args: &Args, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let default_max_price =
            validate_price(args.default_max_price).map_err(|e| ConfigError::InvalidValue {
                name: "default-max-price",
                reason: e.to_string(),
            })?;

        let dedup_scope: DedupScope =
            args.dedup_scope
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: "dedup-scope",
                    reason,
                })?;

        if args.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "poll-interval-secs",
                reason: "must be at least 1".to_string(),
            });
        }

        let monitor = MonitorConfig {
            poll_interval: Duration::from_secs(args.poll_interval_secs),
            cache_limit: args.cache_limit,
            default_max_price,
            dedup_scope,
        };

        let mut tonnel = TonnelConfig::new(non_empty(USER_AUTH_VAR).unwrap_or_default());
        tonnel.request_timeout = Duration::from_secs(args.request_timeout_secs);
        if let Some(base_url) = &args.base_url {
            tonnel.base_url = base_url.clone();
        }

        let alerts = if args.probe {
            None
        } else {
            let token = non_empty(BOT_TOKEN_VAR).ok_or(ConfigError::MissingEnv(BOT_TOKEN_VAR))?;
            let mut alerts = AlertsConfig::new(token);
            if let Some(link_base) = &args.purchase_link_base {
                alerts.purchase_link_base = link_base.clone();
            }
            Some(alerts)
        };

        Ok(Self {
            monitor,
            tonnel,
            alerts,
            probe: args.probe,
        })
    }

    /// Whether a marketplace credential was supplied.
    pub fn has_user_auth(&self) -> bool {
        !self.tonnel.user_auth.is_empty()
    }
}
