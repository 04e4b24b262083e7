// Paper balances and simulated fills

use crate::core::types::{GridSignal, Side};

/// Result of a simulated order that passed its balance check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub side: Side,
    pub price: f64,
    pub size: f64,
    pub fee: f64,
    pub quote_balance: f64,
    pub base_balance: f64,
    pub total_profit: f64,
}

#[derive(Debug, Clone)]
pub struct PaperAccount {
    quote_balance: f64,
    base_balance: f64,
    total_profit: f64,
    trade_size: f64,
    fee_rate: f64,
}

impl PaperAccount {
    pub fn new(initial_quote: f64, trade_size: f64, fee_rate: f64) -> Self {
        Self {
            quote_balance: initial_quote,
            base_balance: 0.0,
            total_profit: 0.0,
            trade_size,
            fee_rate,
        }
    }

    /// Fill `trade_size` at the signal's level. Returns `None` when the
    /// balance check fails; a skipped order leaves the account untouched.
    pub fn execute(&mut self, signal: GridSignal) -> Option<Fill> {
        let price = signal.level();
        let value = price * self.trade_size;
        let fee = value * self.fee_rate;

        match signal {
            GridSignal::Buy(_) => {
                let cost = value + fee;
                if self.quote_balance < cost {
                    return None;
                }
                self.quote_balance -= cost;
                self.base_balance += self.trade_size;
            }
            GridSignal::Sell(_) => {
                if self.base_balance < self.trade_size {
                    return None;
                }
                let proceeds = value - fee;
                self.quote_balance += proceeds;
                self.base_balance -= self.trade_size;
                self.total_profit += proceeds;
            }
        }

        Some(Fill {
            side: signal.side(),
            price,
            size: self.trade_size,
            fee,
            quote_balance: self.quote_balance,
            base_balance: self.base_balance,
            total_profit: self.total_profit,
        })
    }

    /// Quote balance plus holdings marked at `price`
    pub fn total_value(&self, price: f64) -> f64 {
        self.quote_balance + self.base_balance * price
    }

    pub fn quote_balance(&self) -> f64 {
        self.quote_balance
    }

    pub fn base_balance(&self) -> f64 {
        self.base_balance
    }

    pub fn total_profit(&self) -> f64 {
        self.total_profit
    }

    pub fn trade_size(&self) -> f64 {
        self.trade_size
    }
}
