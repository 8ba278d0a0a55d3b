//! Tonnel marketplace REST client.
//!
//! Fetches the first page of unsold, exported gifts for one backdrop class,
//! sorted by ascending price. The request body mirrors what the marketplace
//! web app sends: `sort` and `filter` are JSON documents encoded as strings.

use crate::{FeedError, FeedResult, GiftSource};
use async_trait::async_trait;
use giftwatch_core::{Gift, GiftId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Listing query parameters sent with every fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Regex matched against the gift backdrop
    pub backdrop_pattern: String,
    /// Settlement asset
    pub asset: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 30,
            backdrop_pattern: r"^Black \(".to_string(),
            asset: "TON".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Exists {
    #[serde(rename = "$exists")]
    exists: bool,
}

#[derive(Serialize)]
struct NotEqual {
    #[serde(rename = "$ne")]
    ne: bool,
}

#[derive(Serialize)]
struct Regex<'a> {
    #[serde(rename = "$regex")]
    regex: &'a str,
}

/// Server-side filter: priced, not refunded, no buyer, exported.
#[derive(Serialize)]
struct ListingFilter<'a> {
    price: Exists,
    refunded: NotEqual,
    buyer: Exists,
    export_at: Exists,
    backdrop: Regex<'a>,
    asset: &'a str,
}

/// Ascending price, newest id first on ties.
#[derive(Serialize)]
struct ListingSort {
    price: i8,
    gift_id: i8,
}

#[derive(Serialize)]
struct PageGiftsRequest<'a> {
    page: u32,
    limit: u32,
    sort: String,
    filter: String,
    #[serde(rename = "ref")]
    referrer: u32,
    price_range: Option<[f64; 2]>,
    user_auth: &'a str,
}

impl ListingQuery {
    fn sort_json() -> FeedResult<String> {
        Ok(serde_json::to_string(&ListingSort {
            price: 1,
            gift_id: -1,
        })?)
    }

    fn filter_json(&self) -> FeedResult<String> {
        Ok(serde_json::to_string(&ListingFilter {
            price: Exists { exists: true },
            refunded: NotEqual { ne: true },
            buyer: Exists { exists: false },
            export_at: Exists { exists: true },
            backdrop: Regex {
                regex: &self.backdrop_pattern,
            },
            asset: &self.asset,
        })?)
    }

    /// Build the JSON request body for the `pageGifts` endpoint.
    pub fn request_body(&self, user_auth: &str) -> FeedResult<serde_json::Value> {
        let request = PageGiftsRequest {
            page: self.page,
            limit: self.limit,
            sort: Self::sort_json()?,
            filter: self.filter_json()?,
            referrer: 0,
            price_range: None,
            user_auth,
        };
        Ok(serde_json::to_value(&request)?)
    }
}

/// Gift id as sent by the marketplace: either a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawGiftId {
    Text(String),
    Number(i64),
}

impl From<RawGiftId> for GiftId {
    fn from(raw: RawGiftId) -> Self {
        match raw {
            RawGiftId::Text(s) => GiftId::from(s),
            RawGiftId::Number(n) => GiftId::from(n),
        }
    }
}

#[derive(Deserialize)]
struct RawGift {
    gift_id: RawGiftId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    gift_num: i64,
    #[serde(default)]
    backdrop: String,
    price: f64,
}

impl From<RawGift> for Gift {
    fn from(raw: RawGift) -> Self {
        Gift {
            id: raw.gift_id.into(),
            name: raw.name,
            model: raw.model,
            gift_num: raw.gift_num,
            backdrop: raw.backdrop,
            price: raw.price,
        }
    }
}

/// Parse a `pageGifts` response body (a JSON array of gifts).
pub fn parse_listings(body: &str) -> FeedResult<Vec<Gift>> {
    let raw: Vec<RawGift> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(Gift::from).collect())
}

/// Configuration for [`TonnelClient`].
#[derive(Debug, Clone)]
pub struct TonnelConfig {
    /// Marketplace API base URL
    pub base_url: String,
    /// Opaque credential forwarded as `user_auth`
    pub user_auth: String,
    /// Listing query
    pub query: ListingQuery,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl TonnelConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://gifts2.tonnel.network";

    /// Create config with default endpoint and query.
    pub fn new(user_auth: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            user_auth: user_auth.into(),
            query: ListingQuery::default(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// REST client for the Tonnel gift marketplace.
pub struct TonnelClient {
    http: reqwest::Client,
    endpoint: Url,
    query: ListingQuery,
    user_auth: String,
}

impl TonnelClient {
    const PAGE_GIFTS_PATH: &'static str = "api/pageGifts";

    /// Create a client from config.
    pub fn new(config: TonnelConfig) -> FeedResult<Self> {
        let endpoint = Self::endpoint_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            query: config.query,
            user_auth: config.user_auth,
        })
    }

    /// Listings endpoint under `base_url`, keeping any path prefix.
    fn endpoint_url(base_url: &str) -> FeedResult<Url> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(Self::PAGE_GIFTS_PATH)?)
    }

    /// Full URL of the listings endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GiftSource for TonnelClient {
    async fn fetch_listings(&self) -> FeedResult<Vec<Gift>> {
        let body = self.query.request_body(&self.user_auth)?;

        debug!(url = %self.endpoint, page = self.query.page, limit = self.query.limit, "Requesting listings");

        let response = self.http.post(self.endpoint.clone()).json(&body).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Marketplace responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let gifts = parse_listings(&text)?;
        debug!(count = gifts.len(), "Listings received");

        Ok(gifts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_query() {
        let query = ListingQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 30);
        assert_eq!(query.asset, "TON");
    }

    #[test]
    fn test_sort_and_filter_encoding() {
        let query = ListingQuery::default();
        assert_eq!(ListingQuery::sort_json().unwrap(), r#"{"price":1,"gift_id":-1}"#);
        assert_eq!(
            query.filter_json().unwrap(),
            r#"{"price":{"$exists":true},"refunded":{"$ne":true},"buyer":{"$exists":false},"export_at":{"$exists":true},"backdrop":{"$regex":"^Black \\("},"asset":"TON"}"#
        );
    }

    #[test]
    fn test_request_body() {
        let body = ListingQuery::default().request_body("secret").unwrap();
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 30);
        assert_eq!(body["ref"], 0);
        assert!(body["price_range"].is_null());
        assert_eq!(body["user_auth"], "secret");
        assert!(body["filter"].is_string());
    }

    #[test]
    fn test_parse_listings() {
        let body = r#"[
            {"gift_id": 5521, "name": "Plush Pepe", "model": "Frog", "gift_num": 77,
             "backdrop": "Black (2%)", "price": 3.5, "asset": "TON"},
            {"gift_id": "a-17", "name": "Signet Ring", "model": "Gold", "gift_num": 3,
             "backdrop": "Black (1%)", "price": 12}
        ]"#;
        let gifts = parse_listings(body).unwrap();

        assert_eq!(gifts.len(), 2);
        assert_eq!(gifts[0].id.as_str(), "5521");
        assert_eq!(gifts[0].name, "Plush Pepe");
        assert_eq!(gifts[0].gift_num, 77);
        assert_eq!(gifts[0].price, 3.5);
        assert_eq!(gifts[1].id.as_str(), "a-17");
        assert_eq!(gifts[1].price, 12.0);
    }

    #[test]
    fn test_parse_listings_missing_display_fields() {
        let gifts = parse_listings(r#"[{"gift_id": 1, "price": 0.9}]"#).unwrap();
        assert_eq!(gifts, vec![Gift::priced("1", 0.9)]);
    }

    #[test]
    fn test_parse_listings_rejects_non_array() {
        let err = parse_listings(r#"{"error": "unauthorized"}"#).unwrap_err();
        assert!(matches!(err, FeedError::ParseError(_)));
    }

    #[test]
    fn test_client_endpoint() {
        let client = TonnelClient::new(TonnelConfig::new("auth")).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://gifts2.tonnel.network/api/pageGifts"
        );
    }

    #[test]
    fn test_client_endpoint_keeps_base_path() {
        for base in ["https://proxy.example/tonnel", "https://proxy.example/tonnel/"] {
            let mut config = TonnelConfig::new("auth");
            config.base_url = base.to_string();
            let client = TonnelClient::new(config).unwrap();
            assert_eq!(
                client.endpoint().as_str(),
                "https://proxy.example/tonnel/api/pageGifts"
            );
        }
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let mut config = TonnelConfig::new("auth");
        config.base_url = "not a url".to_string();
        assert!(matches!(
            TonnelClient::new(config),
            Err(FeedError::InvalidEndpoint(_))
        ));
    }
}
