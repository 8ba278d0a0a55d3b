//! Telegram front end configuration.

use url::Url;

/// Mini-app link that opens a gift in the marketplace.
pub const DEFAULT_PURCHASE_LINK_BASE: &str = "https://t.me/tonnel_network_bot/gift";

/// Bot token and link settings.
#[derive(Clone)]
pub struct AlertsConfig {
    /// Bot API token
    pub bot_token: String,
    /// Base of the purchase link; the gift id is appended as `startapp`
    pub purchase_link_base: String,
}

impl std::fmt::Debug for AlertsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertsConfig")
            .field("bot_token", &"<redacted>")
            .field("purchase_link_base", &self.purchase_link_base)
            .finish()
    }
}

impl AlertsConfig {
    /// Create a config with the default purchase link.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            purchase_link_base: DEFAULT_PURCHASE_LINK_BASE.to_string(),
        }
    }

    /// Parsed purchase link base.
    pub fn link_base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.purchase_link_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_link_base() {
        let config = AlertsConfig::new("123:abc");
        assert_eq!(
            config.link_base().unwrap().as_str(),
            "https://t.me/tonnel_network_bot/gift"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let config = AlertsConfig::new("123:secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_invalid_link_base() {
        let mut config = AlertsConfig::new("t");
        config.purchase_link_base = "gift".to_string();
        assert!(config.link_base().is_err());
    }
}
