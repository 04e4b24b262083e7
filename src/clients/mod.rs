// External API clients

pub mod binance_rest;

pub use binance_rest::BinanceRestClient;

use crate::core::types::DailyRange;
use crate::error::TradingResult;

/// Market data the trading loop polls. Implemented by the exchange client;
/// tests drive the loop with scripted feeds.
#[allow(async_fn_in_trait)]
pub trait PriceFeed {
    /// Latest traded price. Timeouts are retried inside the call.
    async fn current_price(&mut self) -> TradingResult<f64>;

    /// 24-hour low and high
    async fn daily_range(&mut self) -> TradingResult<DailyRange>;
}
