//! CSV-backed price feed for offline runs and backtests.
//!
//! Bars live in one file per symbol, `{symbol}.csv`, with a
//! `timestamp,open,high,low,close,volume` header. Timestamps are RFC 3339.

use super::provider::{FeedError, Interval, PriceFeed};
use crate::domain::PriceBar;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvBar> for PriceBar {
    fn from(row: CsvBar) -> Self {
        PriceBar {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvFeed {
    dir: PathBuf,
}

impl CsvFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PriceFeed for CsvFeed {
    fn name(&self) -> &'static str {
        "csv"
    }

    /// The interval is ignored; the file's native sampling is returned.
    fn fetch(
        &self,
        symbol: &str,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<PriceBar>, FeedError> {
        let path = self.dir.join(format!("{symbol}.csv"));
        if !path.exists() {
            return Err(FeedError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut bars = Vec::new();
        for record in reader.deserialize::<CsvBar>() {
            bars.push(PriceBar::from(record?));
        }
        if bars.is_empty() {
            return Err(FeedError::NoData {
                symbol: symbol.to_string(),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        let start = bars.len().saturating_sub(limit);
        debug!(symbol, rows = bars.len(), kept = bars.len() - start, "csv bars loaded");
        Ok(bars.split_off(start))
    }
}
