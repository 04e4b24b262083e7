// One paper-trading session: polling, grid refresh, fills, termination

use std::future::Future;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::clients::PriceFeed;
use crate::config::TradingConfig;
use crate::core::grid::{Grid, GridSchedule};
use crate::core::grid_trader::GridTrader;
use crate::core::paper_account::PaperAccount;
use crate::error::{TradingError, TradingResult};
use crate::journal::{OperationLog, OperationRecord};

/// How a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// Total value reached zero or below
    CapitalLost,
    /// Shutdown signal received
    Interrupted { final_value: f64 },
    /// Anything else that stopped the loop
    Fault { error: TradingError, final_value: f64 },
}

pub struct TradingSession<'a> {
    config: &'a TradingConfig,
    operations: &'a OperationLog,
    initial_capital: f64,
    trader: Option<GridTrader>,
}

impl<'a> TradingSession<'a> {
    pub fn new(config: &'a TradingConfig, operations: &'a OperationLog, initial_capital: f64) -> Self {
        Self {
            config,
            operations,
            initial_capital,
            trader: None,
        }
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Portfolio value at the last sample; the starting capital before trading begins
    pub fn total_value(&self) -> f64 {
        self.trader
            .as_ref()
            .map(GridTrader::total_value)
            .unwrap_or(self.initial_capital)
    }

    pub fn trader(&self) -> Option<&GridTrader> {
        self.trader.as_ref()
    }

    /// Trade until capital is gone, `shutdown` resolves, or something fails.
    ///
    /// Fills are applied between awaits, so a shutdown never lands halfway
    /// through an iteration's fills.
    pub async fn run<F, S>(&mut self, feed: &mut F, shutdown: &mut S) -> SessionOutcome
    where
        F: PriceFeed,
        S: Future<Output = ()> + Unpin,
    {
        let finished = tokio::select! {
            biased;
            _ = &mut *shutdown => None,
            result = self.trade(feed) => Some(result),
        };

        match finished {
            None => SessionOutcome::Interrupted {
                final_value: self.total_value(),
            },
            Some(Ok(())) => SessionOutcome::CapitalLost,
            Some(Err(error)) => SessionOutcome::Fault {
                error,
                final_value: self.total_value(),
            },
        }
    }

    /// Runs until capital is lost (`Ok`) or an error escapes (`Err`)
    async fn trade<F: PriceFeed>(&mut self, feed: &mut F) -> TradingResult<()> {
        let config = self.config;

        let first_price = feed.current_price().await?;
        let grid = self.build_grid(feed).await?;
        let mut schedule = GridSchedule::new(config.grid_refresh_secs, Utc::now());

        info!(
            "🚀 Starting grid trading for {} with {:.2} {}",
            config.symbol, self.initial_capital, config.quote_asset
        );
        info!(
            "🎯 Initial grid: Low={:.4}, High={:.4}, Levels={}",
            grid.low(),
            grid.high(),
            config.grid_levels
        );

        let account = PaperAccount::new(self.initial_capital, config.trade_size, config.fee_rate);
        let mut trader = GridTrader::new(grid, account);
        trader.update_with_price(first_price);
        self.trader = Some(trader);

        loop {
            let price = feed.current_price().await?;

            if schedule.take_due(Utc::now()) {
                let grid = self.build_grid(feed).await?;
                info!("🔄 Grid updated: Low={:.4}, High={:.4}", grid.low(), grid.high());
                self.trader_mut()?.replace_grid(grid);
            }

            let operations = self.operations;
            let trader = self.trader_mut()?;
            let fills = trader.update_with_price(price);
            let now = Local::now().naive_local();
            for fill in &fills {
                operations.append(&OperationRecord::from_fill(fill, now))?;
            }

            let account = trader.account();
            let total_value = account.total_value(price);
            info!(
                "Price: {:.4} | {}: {:.2} | {}: {:.2} | Total value: {:.2}",
                price,
                config.quote_asset,
                account.quote_balance(),
                config.base_asset,
                account.base_balance(),
                total_value
            );

            if total_value <= 0.0 {
                warn!("💀 All capital lost. Closing session.");
                return Ok(());
            }

            sleep(self.poll_interval()).await;
        }
    }

    async fn build_grid<F: PriceFeed>(&self, feed: &mut F) -> TradingResult<Grid> {
        let range = feed.daily_range().await?;
        Grid::from_daily_range(range, self.config.grid_levels, self.config.grid_margin)
    }

    fn trader_mut(&mut self) -> TradingResult<&mut GridTrader> {
        self.trader
            .as_mut()
            .ok_or_else(|| TradingError::Internal("trader used before initialisation".to_string()))
    }

    fn poll_interval(&self) -> Duration {
        self.config.poll_interval()
    }
}
