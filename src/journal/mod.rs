// Durable records of trading sessions

pub mod chart;
pub mod error_log;
pub mod operation_log;
pub mod session_store;

pub use chart::BalanceChart;
pub use error_log::ErrorLog;
pub use operation_log::{OperationLog, OperationRecord, OperationRow};
pub use session_store::{SessionState, SessionStore};

use crate::config::{FilesConfig, TradingConfig};

/// The four files a run writes to, resolved from config
#[derive(Debug, Clone)]
pub struct Journal {
    pub sessions: SessionStore,
    pub operations: OperationLog,
    pub errors: ErrorLog,
    pub chart: BalanceChart,
}

impl Journal {
    pub fn from_config(files: &FilesConfig, trading: &TradingConfig) -> Self {
        Self {
            sessions: SessionStore::new(&files.sessions_file),
            operations: OperationLog::new(&files.operations_file),
            errors: ErrorLog::new(&files.error_log_file, &trading.quote_asset),
            chart: BalanceChart::new(&files.chart_file, &trading.base_asset, &trading.quote_asset),
        }
    }
}
