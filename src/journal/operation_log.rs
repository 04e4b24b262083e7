// Append-only CSV log of simulated fills

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::core::paper_account::Fill;
use crate::core::types::Side;
use crate::error::TradingResult;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER: [&str; 6] = [
    "timestamp",
    "side",
    "price",
    "quote_balance",
    "base_balance",
    "profit",
];

/// One fill, as written to the log
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub price: f64,
    pub quote_balance: f64,
    pub base_balance: f64,
    pub profit: f64,
}

impl OperationRecord {
    pub fn from_fill(fill: &Fill, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            side: fill.side,
            price: fill.price,
            quote_balance: fill.quote_balance,
            base_balance: fill.base_balance,
            profit: fill.total_profit,
        }
    }

    fn to_fields(&self) -> [String; 6] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.side.to_string(),
            format!("{:.4}", self.price),
            format!("{:.2}", self.quote_balance),
            format!("{:.2}", self.base_balance),
            format!("{:.2}", self.profit),
        ]
    }
}

/// One row read back from the log. Logs started with the Spanish header
/// (`operacion`, `precio`, `usdt_balance`, `xrp_balance`) read the same;
/// the column order is identical, so new rows append cleanly under it.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRow {
    pub timestamp: String,
    #[serde(alias = "operacion")]
    pub side: String,
    #[serde(alias = "precio")]
    pub price: f64,
    #[serde(alias = "usdt_balance")]
    pub quote_balance: f64,
    #[serde(alias = "xrp_balance")]
    pub base_balance: f64,
    pub profit: f64,
}

impl OperationRow {
    /// Quote balance plus holdings marked at the fill price
    pub fn total_value(&self) -> f64 {
        self.quote_balance + self.base_balance * self.price
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
}

impl OperationLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The header goes in first when the file is missing or empty.
    pub fn append(&self, record: &OperationRecord) -> TradingResult<()> {
        let fresh = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if fresh {
            writer.write_record(HEADER)?;
        }
        writer.write_record(record.to_fields())?;
        writer.flush()?;
        Ok(())
    }

    /// All rows in file order; a missing log reads as empty
    pub fn read_all(&self) -> TradingResult<Vec<OperationRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(side: Side, price: f64) -> OperationRecord {
        OperationRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            side,
            price,
            quote_balance: 979.98,
            base_balance: 10.0,
            profit: 0.0,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let log = OperationLog::new(dir.path().join("ops.csv"));

        log.append(&record(Side::Buy, 2.0)).unwrap();
        log.append(&record(Side::Sell, 2.5)).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,side,price,quote_balance,base_balance,profit");
        assert_eq!(lines[1], "2024-03-01 09:30:00,BUY,2.0000,979.98,10.00,0.00");
        assert_eq!(content.matches("timestamp").count(), 1);
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ops.csv");
        fs::write(&path, "").unwrap();

        let log = OperationLog::new(&path);
        log.append(&record(Side::Buy, 2.0)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,"));
    }

    #[test]
    fn test_read_back_rows() {
        let dir = TempDir::new().unwrap();
        let log = OperationLog::new(dir.path().join("ops.csv"));
        assert!(log.read_all().unwrap().is_empty());

        log.append(&record(Side::Buy, 2.0)).unwrap();
        let rows = log.read_all().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].side, "BUY");
        assert!((rows[0].total_value() - 999.98).abs() < 1e-9);
        assert!(rows[0].parsed_timestamp().is_some());
    }

    #[test]
    fn test_spanish_header_log_stays_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("operaciones_grid.csv");
        fs::write(
            &path,
            "timestamp,operacion,precio,usdt_balance,xrp_balance,profit\n\
             2024-02-28 14:00:00,BUY,0.5000,994.99,10.00,0.00\n",
        )
        .unwrap();

        let log = OperationLog::new(&path);
        log.append(&record(Side::Sell, 2.5)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("timestamp").count(), 1);

        let rows = log.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].side, "BUY");
        assert!((rows[0].price - 0.5).abs() < 1e-12);
        assert!((rows[0].total_value() - 999.99).abs() < 1e-9);
        assert_eq!(rows[1].side, "SELL");
        assert!((rows[1].quote_balance - 979.98).abs() < 1e-9);
    }
}
