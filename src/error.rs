//! Unified error type for the grid paper trader
//!
//! Every fallible operation in the crate returns [`TradingResult`]. Variants are
//! grouped by the subsystem that raised them so the supervisor can log a
//! category alongside the message.

use std::fmt;
use std::io;

/// Main error type for the grid paper trader
#[derive(Debug)]
pub enum TradingError {
    // Configuration errors
    ConfigNotFound(String),
    ConfigParse(String),
    ConfigValidation(String),

    // Exchange API errors
    ApiConnection(String),
    ApiTimeout(String),
    ApiRateLimit(String),
    ApiResponse(String),

    // Market data that cannot produce a usable grid
    InvalidMarketData(String),

    // Journal errors
    FileRead(String),
    FileWrite(String),
    Journal(String),

    // Supervisor errors
    RestartLimitReached(u32),
    SessionPanicked(String),

    // General errors
    InvalidParameter(String, String), // (parameter_name, reason)
    Internal(String),
}

impl TradingError {
    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            TradingError::ConfigNotFound(path) => {
                format!(
                    "Configuration file not found: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: grid-paper init\n\
                    2. Edit the config with your trading pair and grid settings\n\
                    3. Try again",
                    path
                )
            }
            TradingError::ConfigParse(msg) if msg.contains("missing field `trading`") => {
                format!(
                    "Failed to parse config: {}\n\n\
                    💡 The config needs nested sections (exchange, trading, files, restart).\n\
                    A flat file with API_KEY, SYMBOL, GRID_LEVELS... keys is the old layout:\n\
                    1. Run: grid-paper -c new-config.json init\n\
                    2. Copy SYMBOL, GRID_LEVELS, TRADE_SIZE and FEE_RATE into \"trading\"\n\
                    3. Copy API_KEY and API_SECRET into \"exchange\"",
                    msg
                )
            }
            TradingError::ConfigValidation(msg) => {
                format!(
                    "Configuration validation error: {}\n\n\
                    💡 Check the config for:\n\
                    - A non-empty trading symbol\n\
                    - Positive trade size and intervals\n\
                    - Fee rate and grid margin between 0 and 1",
                    msg
                )
            }
            TradingError::RestartLimitReached(restarts) => {
                format!(
                    "Trading stopped after {} restarts\n\n\
                    💡 Inspect the error log for the repeated fault before starting again",
                    restarts
                )
            }
            TradingError::ApiRateLimit(msg) => {
                format!(
                    "API rate limit exceeded: {}\n\n\
                    💡 Increase poll_interval_secs in the config",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }

    /// Timeouts on the price fetch are retried in place and never reach the supervisor
    pub fn is_timeout(&self) -> bool {
        matches!(self, TradingError::ApiTimeout(_))
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TradingError::ConfigNotFound(_)
            | TradingError::ConfigParse(_)
            | TradingError::ConfigValidation(_) => "config",

            TradingError::ApiConnection(_)
            | TradingError::ApiTimeout(_)
            | TradingError::ApiRateLimit(_)
            | TradingError::ApiResponse(_) => "api",

            TradingError::InvalidMarketData(_) => "market",

            TradingError::FileRead(_) | TradingError::FileWrite(_) | TradingError::Journal(_) => {
                "io"
            }

            TradingError::RestartLimitReached(_) | TradingError::SessionPanicked(_) => "supervisor",

            TradingError::InvalidParameter(_, _) | TradingError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for TradingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path)
            }
            TradingError::ConfigParse(msg) => {
                write!(f, "Configuration parse error: {}", msg)
            }
            TradingError::ConfigValidation(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }

            TradingError::ApiConnection(msg) => {
                write!(f, "API connection error: {}", msg)
            }
            TradingError::ApiTimeout(msg) => {
                write!(f, "API timeout: {}", msg)
            }
            TradingError::ApiRateLimit(msg) => {
                write!(f, "API rate limit exceeded: {}", msg)
            }
            TradingError::ApiResponse(msg) => {
                write!(f, "API response error: {}", msg)
            }

            TradingError::InvalidMarketData(msg) => {
                write!(f, "Invalid market data: {}", msg)
            }

            TradingError::FileRead(msg) => {
                write!(f, "File read error: {}", msg)
            }
            TradingError::FileWrite(msg) => {
                write!(f, "File write error: {}", msg)
            }
            TradingError::Journal(msg) => {
                write!(f, "Journal error: {}", msg)
            }

            TradingError::RestartLimitReached(restarts) => {
                write!(f, "Restart limit reached after {} restarts", restarts)
            }
            TradingError::SessionPanicked(msg) => {
                write!(f, "Trading session panicked: {}", msg)
            }

            TradingError::InvalidParameter(param, reason) => {
                write!(f, "Invalid parameter '{}': {}", param, reason)
            }
            TradingError::Internal(msg) => {
                write!(f, "Internal error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TradingError {}

// Conversion implementations for common error types

impl From<io::Error> for TradingError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => TradingError::FileRead(err.to_string()),
            io::ErrorKind::TimedOut => TradingError::ApiTimeout(err.to_string()),
            _ => TradingError::FileWrite(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TradingError {
    fn from(err: serde_json::Error) -> Self {
        TradingError::Journal(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for TradingError {
    fn from(err: toml::de::Error) -> Self {
        TradingError::ConfigParse(format!("TOML parse error: {}", err))
    }
}

impl From<csv::Error> for TradingError {
    fn from(err: csv::Error) -> Self {
        TradingError::Journal(format!("CSV error: {}", err))
    }
}

impl From<reqwest::Error> for TradingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TradingError::ApiTimeout(err.to_string())
        } else if err.is_status() {
            TradingError::ApiResponse(err.to_string())
        } else if err.is_decode() {
            TradingError::ApiResponse(format!("Malformed response: {}", err))
        } else {
            TradingError::ApiConnection(err.to_string())
        }
    }
}

impl From<crate::config::ConfigError> for TradingError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::FileNotFound(path) => TradingError::ConfigNotFound(path),
            ConfigError::FileRead(msg) => TradingError::FileRead(msg),
            ConfigError::FileWrite(msg) => TradingError::FileWrite(msg),
            ConfigError::Parse(msg) => TradingError::ConfigParse(msg),
            ConfigError::Serialize(msg) => TradingError::Internal(msg),
            ConfigError::Validation(msg) => TradingError::ConfigValidation(msg),
        }
    }
}

impl From<String> for TradingError {
    fn from(msg: String) -> Self {
        TradingError::Internal(msg)
    }
}

impl From<&str> for TradingError {
    fn from(msg: &str) -> Self {
        TradingError::Internal(msg.to_string())
    }
}

/// Result type alias using TradingError
pub type TradingResult<T> = Result<T, TradingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TradingError::ConfigNotFound("config.json".to_string());
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_error_category() {
        let err = TradingError::ConfigValidation("test".to_string());
        assert_eq!(err.category(), "config");

        let err = TradingError::Journal("test".to_string());
        assert_eq!(err.category(), "io");

        let err = TradingError::ApiTimeout("test".to_string());
        assert_eq!(err.category(), "api");

        let err = TradingError::RestartLimitReached(5);
        assert_eq!(err.category(), "supervisor");
    }

    #[test]
    fn test_flat_config_gets_layout_hint() {
        let err = TradingError::ConfigParse("missing field `trading` at line 8 column 1".to_string());
        let msg = err.user_message();
        assert!(msg.contains("missing field `trading`"));
        assert!(msg.contains("grid-paper -c new-config.json init"));

        let err = TradingError::ConfigParse("expected value at line 1 column 1".to_string());
        assert_eq!(err.user_message(), err.to_string());
    }

    #[test]
    fn test_only_timeouts_are_retried_in_place() {
        assert!(TradingError::ApiTimeout("read".to_string()).is_timeout());
        assert!(!TradingError::ApiConnection("refused".to_string()).is_timeout());
        assert!(!TradingError::ApiRateLimit("429".to_string()).is_timeout());
    }

    #[test]
    fn test_user_message() {
        let err = TradingError::RestartLimitReached(5);
        let msg = err.user_message();
        assert!(msg.contains("5 restarts"));
        assert!(msg.contains("💡"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let trading_err: TradingError = io_err.into();
        assert!(matches!(trading_err, TradingError::FileRead(_)));

        let io_err = io::Error::new(io::ErrorKind::TimedOut, "slow");
        let trading_err: TradingError = io_err.into();
        assert!(trading_err.is_timeout());
    }
}
