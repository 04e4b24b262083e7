// Grid bounds and levels derived from the 24h range

use chrono::{DateTime, Utc};

use crate::core::types::DailyRange;
use crate::error::{TradingError, TradingResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    low: f64,
    high: f64,
    levels: Vec<f64>,
}

impl Grid {
    /// Widen the 24h range by `margin` on both sides and spread `level_count`
    /// levels evenly across it, both bounds included.
    pub fn from_daily_range(range: DailyRange, level_count: usize, margin: f64) -> TradingResult<Self> {
        if !(range.low > 0.0) || !range.high.is_finite() {
            return Err(TradingError::InvalidMarketData(format!(
                "24h low must be positive and finite (low={}, high={})",
                range.low, range.high
            )));
        }
        if range.high < range.low {
            return Err(TradingError::InvalidMarketData(format!(
                "24h high {} is below 24h low {}",
                range.high, range.low
            )));
        }
        if level_count == 0 {
            return Err(TradingError::InvalidParameter(
                "grid_levels".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let low = range.low * (1.0 - margin);
        let high = range.high * (1.0 + margin);
        let levels = linspace(low, high, level_count);

        if levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TradingError::InvalidMarketData(format!(
                "range [{:.6}, {:.6}] is too narrow for {} levels",
                low, high, level_count
            )));
        }

        Ok(Self { low, high, levels })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![start];
    }
    let step = (end - start) / (count - 1) as f64;
    (0..count)
        .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
        .collect()
}

/// Decides when the grid is due for a refresh. Time is cut into fixed slots
/// aligned to the Unix epoch; the first check in a new slot fires.
#[derive(Debug, Clone)]
pub struct GridSchedule {
    interval_secs: i64,
    last_slot: i64,
}

impl GridSchedule {
    pub fn new(interval_secs: u64, built_at: DateTime<Utc>) -> Self {
        let interval_secs = interval_secs.max(1) as i64;
        Self {
            interval_secs,
            last_slot: built_at.timestamp().div_euclid(interval_secs),
        }
    }

    /// Returns true at most once per slot and marks that slot as refreshed
    pub fn take_due(&mut self, now: DateTime<Utc>) -> bool {
        let slot = now.timestamp().div_euclid(self.interval_secs);
        if slot > self.last_slot {
            self.last_slot = slot;
            true
        } else {
            false
        }
    }
}
