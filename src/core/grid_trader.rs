// Grid crossing detection and fill generation

use tracing::info;

use crate::core::grid::Grid;
use crate::core::paper_account::{Fill, PaperAccount};
use crate::core::types::GridSignal;

/// Every level crossed between two consecutive samples, in ascending level order.
///
/// A rise through a level (`previous < level <= current`) is a sell; a fall
/// through it (`previous > level >= current`) is a buy.
pub fn detect_crossings(previous: f64, current: f64, levels: &[f64]) -> Vec<GridSignal> {
    levels
        .iter()
        .filter_map(|&level| {
            if previous < level && level <= current {
                Some(GridSignal::Sell(level))
            } else if previous > level && level >= current {
                Some(GridSignal::Buy(level))
            } else {
                None
            }
        })
        .collect()
}

pub struct GridTrader {
    grid: Grid,
    account: PaperAccount,
    last_price: Option<f64>,
}

impl GridTrader {
    pub fn new(grid: Grid, account: PaperAccount) -> Self {
        Self {
            grid,
            account,
            last_price: None,
        }
    }

    /// Feed one price sample. The first sample only seeds the previous price.
    pub fn update_with_price(&mut self, price: f64) -> Vec<Fill> {
        let fills = match self.last_price {
            Some(previous) => detect_crossings(previous, price, self.grid.levels())
                .into_iter()
                .filter_map(|signal| self.account.execute(signal))
                .collect(),
            None => Vec::new(),
        };

        for fill in &fills {
            info!(
                "{} {} @ {:.4} (Fee: {:.4})",
                fill.side, fill.size, fill.price, fill.fee
            );
        }

        self.last_price = Some(price);
        fills
    }

    pub fn replace_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }

    /// Portfolio value at the last sample, or the bare quote balance before any sample
    pub fn total_value(&self) -> f64 {
        match self.last_price {
            Some(price) => self.account.total_value(price),
            None => self.account.quote_balance(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn account(&self) -> &PaperAccount {
        &self.account
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }
}
