// Append-only text log of session faults and capital loss

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::TradingResult;
use crate::journal::operation_log::TIMESTAMP_FORMAT;

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
    quote_asset: String,
}

impl ErrorLog {
    pub fn new<P: AsRef<Path>>(path: P, quote_asset: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            quote_asset: quote_asset.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, reason: &str, final_balance: f64) -> TradingResult<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(
            file,
            "{} | Reason: {} | Final balance: {:.2} {}",
            Local::now().format(TIMESTAMP_FORMAT),
            reason,
            final_balance,
            self.quote_asset
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_entries_append() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log"), "USDT");

        log.record("Capital lost (balance 0)", 0.0).unwrap();
        log.record("Unexpected error: boom", 512.3).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("| Reason: Capital lost (balance 0) | Final balance: 0.00 USDT"));
        assert!(lines[1].contains("Final balance: 512.30 USDT"));
    }
}
