//! Binance spot REST client for the two public market-data reads the trader needs.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::clients::PriceFeed;
use crate::config::{ExchangeConfig, TradingConfig};
use crate::core::error_handling::retry_on_timeout;
use crate::core::types::DailyRange;
use crate::error::{TradingError, TradingResult};

const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";
const TICKER_24H_PATH: &str = "/api/v3/ticker/24hr";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Response from GET /api/v3/ticker/price
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_f64_from_str")]
    pub price: f64,
}

/// Subset of GET /api/v3/ticker/24hr
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker24hResponse {
    pub symbol: String,
    #[serde(rename = "highPrice", deserialize_with = "deserialize_f64_from_str")]
    pub high_price: f64,
    #[serde(rename = "lowPrice", deserialize_with = "deserialize_f64_from_str")]
    pub low_price: f64,
}

/// Binance sends prices as decimal strings
fn deserialize_f64_from_str<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<f64>().map_err(serde::de::Error::custom)
}

#[derive(Debug)]
pub struct BinanceRestClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    symbol: String,
    timeout_retry_delay: Duration,
}

impl BinanceRestClient {
    pub fn new(exchange: &ExchangeConfig, trading: &TradingConfig) -> TradingResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(exchange.request_timeout_secs))
            .build()
            .map_err(|e| TradingError::ApiConnection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: exchange.base_url.trim_end_matches('/').to_string(),
            api_key: exchange.api_key.clone(),
            symbol: trading.symbol.clone(),
            timeout_retry_delay: trading.timeout_retry_delay(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// One attempt at GET /api/v3/ticker/price
    pub async fn fetch_ticker_price(&self) -> TradingResult<TickerPriceResponse> {
        self.get(TICKER_PRICE_PATH).await
    }

    /// One attempt at GET /api/v3/ticker/24hr
    pub async fn fetch_ticker_24h(&self) -> TradingResult<Ticker24hResponse> {
        self.get(TICKER_24H_PATH).await
    }

    async fn get<T>(&self, path: &str) -> TradingResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, symbol = %self.symbol, "GET");

        let mut request = self.client.get(&url).query(&[("symbol", self.symbol.as_str())]);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
            return Err(TradingError::ApiRateLimit(format!("HTTP {} on {}", status, path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradingError::ApiResponse(format!("HTTP {} on {}: {}", status, path, body)));
        }

        Ok(response.json::<T>().await?)
    }
}

impl PriceFeed for BinanceRestClient {
    async fn current_price(&mut self) -> TradingResult<f64> {
        let this = &*self;
        let ticker = retry_on_timeout(this.timeout_retry_delay, move || this.fetch_ticker_price()).await?;
        Ok(ticker.price)
    }

    async fn daily_range(&mut self) -> TradingResult<DailyRange> {
        let stats = self.fetch_ticker_24h().await?;
        Ok(DailyRange {
            low: stats.low_price,
            high: stats.high_price,
        })
    }
}
