// Grid Paper Trader Library
//
// Polls an exchange for one trading pair, detects grid-level crossings and
// records simulated fills against an in-memory paper balance

pub mod core;
pub mod clients;
pub mod config;
pub mod error;       // Unified error handling
pub mod journal;     // Session record, operation log, error log, chart

// Re-export core trading types
pub use core::{
    detect_crossings, DailyRange, Fill, Grid, GridSchedule, GridSignal, GridTrader, PaperAccount,
    RestartPolicy, SessionOutcome, Side, Supervisor, TradingSession,
};

// Re-export error types
pub use error::{TradingError, TradingResult};

// Re-export client types
pub use clients::{BinanceRestClient, PriceFeed};

// Re-export configuration
pub use config::{Config, ConfigError, ExchangeConfig, FilesConfig, RestartConfig, TradingConfig};

// Re-export journal types
pub use journal::{
    BalanceChart, ErrorLog, Journal, OperationLog, OperationRecord, OperationRow, SessionState,
    SessionStore,
};
