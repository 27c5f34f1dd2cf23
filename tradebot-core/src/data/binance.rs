//! Binance klines feed.
//!
//! Talks to the public `/api/v3/klines` endpoint with a blocking client.
//! Binance serializes prices as JSON strings inside positional arrays, so
//! each row is decoded field by field.

use super::provider::{FeedError, Interval, PriceFeed};
use crate::domain::PriceBar;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BinanceFeed {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceFeed {
    pub fn new() -> Result<Self, FeedError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the feed somewhere else, mainly for tests against a local stub.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PriceFeed for BinanceFeed {
    fn name(&self) -> &'static str {
        "binance"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<PriceBar>, FeedError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        debug!(symbol, %interval, limit, "requesting klines");
        let rows: Vec<Value> = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", &interval.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        if rows.is_empty() {
            return Err(FeedError::NoData {
                symbol: symbol.to_string(),
            });
        }
        rows.iter().map(parse_kline).collect()
    }
}

/// One kline row: `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.
fn parse_kline(row: &Value) -> Result<PriceBar, FeedError> {
    let fields = row
        .as_array()
        .ok_or_else(|| FeedError::Parse("kline row is not an array".into()))?;
    if fields.len() < 6 {
        return Err(FeedError::Parse(format!(
            "kline row has {} fields, expected at least 6",
            fields.len()
        )));
    }

    let open_time = fields[0]
        .as_i64()
        .ok_or_else(|| FeedError::Parse("open time is not an integer".into()))?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(open_time)
        .ok_or_else(|| FeedError::Parse(format!("open time {open_time} out of range")))?;

    let number = |index: usize, name: &str| -> Result<f64, FeedError> {
        fields[index]
            .as_str()
            .ok_or_else(|| FeedError::Parse(format!("{name} is not a string")))?
            .parse::<f64>()
            .map_err(|_| FeedError::Parse(format!("{name} is not numeric")))
    };

    Ok(PriceBar {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_row() {
        let row = json!([
            1700000000000i64,
            "30000.5",
            "30100.0",
            "29900.0",
            "30050.25",
            "123.45",
            1700003599999i64
        ]);
        let bar = parse_kline(&row).unwrap();
        assert_eq!(bar.open, 30000.5);
        assert_eq!(bar.close, 30050.25);
        assert_eq!(bar.volume, 123.45);
        assert_eq!(bar.timestamp.timestamp_millis(), 1700000000000);
    }

    #[test]
    fn rejects_short_and_non_numeric_rows() {
        assert!(parse_kline(&json!([1700000000000i64, "1.0"])).is_err());
        assert!(parse_kline(&json!([
            1700000000000i64,
            "abc",
            "1",
            "1",
            "1",
            "1"
        ]))
        .is_err());
        assert!(parse_kline(&json!({"open": 1.0})).is_err());
    }
}
