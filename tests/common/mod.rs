// Common test utilities and helpers

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;

use grid_paper_trader::{
    Config, DailyRange, ExchangeConfig, FilesConfig, Journal, PriceFeed, RestartConfig,
    TradingConfig, TradingError, TradingResult,
};
use tokio::sync::oneshot;

/// Test configuration: grid from 90/110 gives levels 88.2, 100.2, 112.2;
/// no sleeps between samples or restarts; journal files under `dir`.
pub fn create_test_config(dir: &Path) -> Config {
    Config {
        exchange: ExchangeConfig::default(),
        trading: TradingConfig {
            symbol: "XRPUSDT".to_string(),
            base_asset: "XRP".to_string(),
            quote_asset: "USDT".to_string(),
            grid_levels: 3,
            trade_size: 1.0,
            fee_rate: 0.001,
            grid_margin: 0.02,
            poll_interval_secs: 0,
            grid_refresh_secs: 600,
            timeout_retry_secs: 0,
        },
        files: FilesConfig {
            sessions_file: dir.join("sessions.json").display().to_string(),
            operations_file: dir.join("operations.csv").display().to_string(),
            error_log_file: dir.join("errors.log").display().to_string(),
            chart_file: dir.join("balance.svg").display().to_string(),
        },
        restart: RestartConfig {
            max_restarts: 1,
            base_delay_secs: 0,
            max_delay_secs: 0,
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
            reset_after_secs: 3600,
        },
    }
}

pub fn test_journal(config: &Config) -> Journal {
    Journal::from_config(&config.files, &config.trading)
}

pub const TEST_RANGE: DailyRange = DailyRange { low: 90.0, high: 110.0 };

pub enum Step {
    Price(f64),
    Fail(TradingError),
    Panic,
}

/// Price feed that plays back a script. Once the script runs out it fires
/// the paired shutdown future and then never answers again.
pub struct ScriptedFeed {
    steps: VecDeque<Step>,
    range: DailyRange,
    later_range: Option<(usize, DailyRange)>,
    exhausted: Option<oneshot::Sender<()>>,
    pub price_calls: usize,
    pub range_calls: usize,
}

impl ScriptedFeed {
    pub fn new(steps: Vec<Step>) -> (Self, impl Future<Output = ()>) {
        let (tx, rx) = oneshot::channel();
        let feed = Self {
            steps: steps.into(),
            range: TEST_RANGE,
            later_range: None,
            exhausted: Some(tx),
            price_calls: 0,
            range_calls: 0,
        };
        let shutdown = async move {
            let _ = rx.await;
        };
        (feed, shutdown)
    }

    pub fn prices(prices: &[f64]) -> (Self, impl Future<Output = ()>) {
        Self::new(prices.iter().map(|&p| Step::Price(p)).collect())
    }

    /// Serve `range` once more than `after_prices` prices have been handed out
    pub fn with_range_after(mut self, after_prices: usize, range: DailyRange) -> Self {
        self.later_range = Some((after_prices, range));
        self
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl PriceFeed for ScriptedFeed {
    async fn current_price(&mut self) -> TradingResult<f64> {
        self.price_calls += 1;
        match self.steps.pop_front() {
            Some(Step::Price(price)) => Ok(price),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Panic) => panic!("scripted feed panic"),
            None => {
                if let Some(tx) = self.exhausted.take() {
                    let _ = tx.send(());
                }
                std::future::pending().await
            }
        }
    }

    async fn daily_range(&mut self) -> TradingResult<DailyRange> {
        self.range_calls += 1;
        match self.later_range {
            Some((after, range)) if self.price_calls > after => Ok(range),
            _ => Ok(self.range),
        }
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
