// Configuration management for the grid paper trader

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    pub symbol: String,
    #[serde(default = "default_base_asset")]
    pub base_asset: String,
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    pub grid_levels: usize,
    pub trade_size: f64,
    pub fee_rate: f64,
    #[serde(default = "default_grid_margin")]
    pub grid_margin: f64,         // Fraction added below the 24h low and above the 24h high
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_grid_refresh")]
    pub grid_refresh_secs: u64,
    #[serde(default = "default_timeout_retry")]
    pub timeout_retry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_sessions_file")]
    pub sessions_file: String,
    #[serde(default = "default_operations_file")]
    pub operations_file: String,
    #[serde(default = "default_error_log_file")]
    pub error_log_file: String,
    #[serde(default = "default_chart_file")]
    pub chart_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartConfig {
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
    #[serde(default = "default_reset_after")]
    pub reset_after_secs: u64,    // A session that survives this long clears the restart count
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    pub trading: TradingConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub restart: RestartConfig,
}

// Default value functions
fn default_base_url() -> String { "https://testnet.binance.vision".to_string() }
fn default_request_timeout() -> u64 { 10 }
fn default_base_asset() -> String { "XRP".to_string() }
fn default_quote_asset() -> String { "USDT".to_string() }
fn default_grid_margin() -> f64 { 0.02 }
fn default_poll_interval() -> u64 { 5 }
fn default_grid_refresh() -> u64 { 600 }
fn default_timeout_retry() -> u64 { 5 }
fn default_sessions_file() -> String { "registro_sesiones.json".to_string() }
fn default_operations_file() -> String { "operaciones_grid.csv".to_string() }
fn default_error_log_file() -> String { "errores_bot.log".to_string() }
fn default_chart_file() -> String { "grafico_balance.svg".to_string() }
fn default_max_restarts() -> u32 { 5 }
fn default_base_delay() -> u64 { 10 }
fn default_max_delay() -> u64 { 300 }
fn default_backoff_multiplier() -> f64 { 2.0 }
fn default_jitter_factor() -> f64 { 0.1 }
fn default_reset_after() -> u64 { 3600 }

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            symbol: "XRPUSDT".to_string(),
            base_asset: default_base_asset(),
            quote_asset: default_quote_asset(),
            grid_levels: 10,
            trade_size: 10.0,
            fee_rate: 0.001,
            grid_margin: default_grid_margin(),
            poll_interval_secs: default_poll_interval(),
            grid_refresh_secs: default_grid_refresh(),
            timeout_retry_secs: default_timeout_retry(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            sessions_file: default_sessions_file(),
            operations_file: default_operations_file(),
            error_log_file: default_error_log_file(),
            chart_file: default_chart_file(),
        }
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            max_restarts: default_max_restarts(),
            base_delay_secs: default_base_delay(),
            max_delay_secs: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
            reset_after_secs: default_reset_after(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig::default(),
            trading: TradingConfig::default(),
            files: FilesConfig::default(),
            restart: RestartConfig::default(),
        }
    }
}

impl TradingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout_retry_delay(&self) -> Duration {
        Duration::from_secs(self.timeout_retry_secs)
    }
}

/// On-disk format, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file (or TOML when the extension is `.toml`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config = Self::parse(&content, ConfigFormat::for_path(path))?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration, using the same extension rule as [`Config::from_file`]
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match ConfigFormat::for_path(path) {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let trading = &self.trading;

        if trading.symbol.trim().is_empty() {
            return Err(ConfigError::Validation("symbol must not be empty".to_string()));
        }

        if trading.grid_levels == 0 {
            return Err(ConfigError::Validation("grid_levels must be greater than 0".to_string()));
        }

        if !(trading.trade_size > 0.0) {
            return Err(ConfigError::Validation("trade_size must be positive".to_string()));
        }

        if !(0.0..1.0).contains(&trading.fee_rate) {
            return Err(ConfigError::Validation("fee_rate must be in [0, 1)".to_string()));
        }

        if !(0.0..1.0).contains(&trading.grid_margin) {
            return Err(ConfigError::Validation("grid_margin must be in [0, 1)".to_string()));
        }

        if trading.poll_interval_secs == 0 {
            return Err(ConfigError::Validation("poll_interval_secs must be greater than 0".to_string()));
        }

        if trading.grid_refresh_secs == 0 {
            return Err(ConfigError::Validation("grid_refresh_secs must be greater than 0".to_string()));
        }

        if self.exchange.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request_timeout_secs must be greater than 0".to_string()));
        }

        if self.restart.backoff_multiplier < 1.0 {
            return Err(ConfigError::Validation("backoff_multiplier must be at least 1.0".to_string()));
        }

        if !(0.0..=1.0).contains(&self.restart.jitter_factor) {
            return Err(ConfigError::Validation("jitter_factor must be in [0, 1]".to_string()));
        }

        if self.restart.max_delay_secs < self.restart.base_delay_secs {
            return Err(ConfigError::Validation("max_delay_secs must not be below base_delay_secs".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
