// Core trading logic modules

pub mod types;
pub mod grid;
pub mod paper_account;
pub mod grid_trader;
pub mod error_handling;
pub mod live_trading;
pub mod supervisor;

// Re-export commonly used types
pub use types::{DailyRange, GridSignal, Side};
pub use grid::{Grid, GridSchedule};
pub use paper_account::{Fill, PaperAccount};
pub use grid_trader::{detect_crossings, GridTrader};
pub use error_handling::{retry_on_timeout, RestartPolicy};
pub use live_trading::{SessionOutcome, TradingSession};
pub use supervisor::Supervisor;
