// Common types used across the trading core

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSignal {
    Buy(f64),   // Price fell through this level
    Sell(f64),  // Price rose through this level
}

impl GridSignal {
    pub fn side(&self) -> Side {
        match self {
            GridSignal::Buy(_) => Side::Buy,
            GridSignal::Sell(_) => Side::Sell,
        }
    }

    pub fn level(&self) -> f64 {
        match self {
            GridSignal::Buy(level) | GridSignal::Sell(level) => *level,
        }
    }
}

/// 24-hour low/high as reported by the exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRange {
    pub low: f64,
    pub high: f64,
}
