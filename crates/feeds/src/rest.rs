//! REST price sources.
//!
//! Each source performs one (or, for DexTools, a couple of) HTTP GET requests
//! and reports either a usable USD price or a `FeedError`. Sources never retry;
//! the resolver moves on to the next source instead.

use crate::error::FeedError;
use crate::extract::{extract_price, first_price_field, pair_price, rank_by_liquidity};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use token_monitor_core::{Chain, SourceKind};
use tracing::debug;

/// A single upstream price provider.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> SourceKind;

    /// Fetch the USD price of `address` on `chain`.
    async fn fetch_price(&self, address: &str, chain: Chain) -> Result<f64, FeedError>;
}

/// Settings shared by the HTTP sources.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Birdeye API key; the public endpoint accepts an empty key.
    pub birdeye_api_key: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            birdeye_api_key: String::new(),
        }
    }
}

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the HTTP client shared by all sources.
pub fn build_http_client(config: &SourceConfig) -> Result<Client, FeedError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    // DexTools rejects requests without its own referer
    headers.insert(REFERER, HeaderValue::from_static("https://www.dextools.io/"));

    Client::builder()
        .timeout(config.request_timeout)
        .default_headers(headers)
        .build()
        .map_err(FeedError::from)
}

/// GET a URL and decode the body as JSON, mapping non-success statuses to errors.
async fn get_json(request: reqwest::RequestBuilder) -> Result<Value, FeedError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::HttpStatus(status.as_u16()));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Jupiter price API (Solana).
pub struct JupiterSource {
    client: Client,
}

impl JupiterSource {
    const BASE_URL: &'static str = "https://price.jup.ag/v4/price";

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Response: `{"data": {"<mint>": {"price": 0.0031, ...}}}`
    pub fn parse_price(json: &Value, address: &str) -> Option<f64> {
        first_price_field(json.get("data")?.get(address)?, &["price"])
    }
}

#[async_trait]
impl PriceSource for JupiterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Jupiter
    }

    async fn fetch_price(&self, address: &str, _chain: Chain) -> Result<f64, FeedError> {
        let request = self.client.get(Self::BASE_URL).query(&[("ids", address)]);
        let json = get_json(request).await?;
        Self::parse_price(&json, address)
            .ok_or_else(|| FeedError::MissingPrice(format!("data.{}.price", address)))
    }
}

/// DexScreener token pairs API (all chains).
pub struct DexScreenerSource {
    client: Client,
}

impl DexScreenerSource {
    const BASE_URL: &'static str = "https://api.dexscreener.com/latest/dex/tokens";

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Pick the highest-liquidity pair on `chain` and return its USD price.
    /// Pairs without a `chainId` are kept; pairs on other chains are dropped.
    pub fn parse_price(json: &Value, chain: Chain) -> Option<f64> {
        let pairs = json.get("pairs")?.as_array()?;
        let on_chain = pairs.iter().filter(|pair| {
            pair.get("chainId")
                .and_then(Value::as_str)
                .map_or(true, |id| id.eq_ignore_ascii_case(chain.as_str()))
        });
        let best = rank_by_liquidity(on_chain).into_iter().next()?;
        pair_price(best)
    }
}

#[async_trait]
impl PriceSource for DexScreenerSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DexScreener
    }

    async fn fetch_price(&self, address: &str, chain: Chain) -> Result<f64, FeedError> {
        let url = format!("{}/{}", Self::BASE_URL, address);
        let json = get_json(self.client.get(&url)).await?;
        Self::parse_price(&json, chain)
            .ok_or_else(|| FeedError::MissingPrice(format!("no {} pair with priceUsd", chain)))
    }
}

/// DexTools shared and public endpoints. Response shapes vary, so the
/// tolerant extractor is used for both.
pub struct DexToolsSource {
    client: Client,
}

impl DexToolsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn endpoints(address: &str, chain: Chain) -> [String; 2] {
        [
            format!(
                "https://www.dextools.io/shared/data/pair?address={}&chain={}",
                address, chain
            ),
            format!("https://api.dextools.io/v1/token/{}/{}", chain, address),
        ]
    }
}

#[async_trait]
impl PriceSource for DexToolsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DexTools
    }

    async fn fetch_price(&self, address: &str, chain: Chain) -> Result<f64, FeedError> {
        let mut last_error = FeedError::MissingPrice("no endpoint answered".to_string());

        for url in Self::endpoints(address, chain) {
            match get_json(self.client.get(&url)).await {
                Ok(json) => match extract_price(&json) {
                    Some(price) => return Ok(price),
                    None => last_error = FeedError::MissingPrice(url),
                },
                Err(e) => {
                    debug!(url = %url, error = %e, "DexTools endpoint failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// Birdeye public price API (Solana).
pub struct BirdeyeSource {
    client: Client,
    api_key: String,
}

impl BirdeyeSource {
    const BASE_URL: &'static str = "https://public-api.birdeye.so/v1/token/price";

    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Response: `{"data": {"value": 0.0031, ...}, "success": true}`
    pub fn parse_price(json: &Value) -> Option<f64> {
        first_price_field(json.get("data")?, &["value"])
    }
}

#[async_trait]
impl PriceSource for BirdeyeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Birdeye
    }

    async fn fetch_price(&self, address: &str, _chain: Chain) -> Result<f64, FeedError> {
        let request = self
            .client
            .get(Self::BASE_URL)
            .query(&[("address", address)])
            .header("X-API-KEY", self.api_key.as_str());
        let json = get_json(request).await?;
        Self::parse_price(&json).ok_or_else(|| FeedError::MissingPrice("data.value".to_string()))
    }
}
