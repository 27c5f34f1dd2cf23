//! Market data feed abstraction.

use crate::domain::PriceBar;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("csv read failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed feed payload: {0}")]
    Parse(String),
    #[error("no data returned for {symbol}")]
    NoData { symbol: String },
    #[error("every feed in the chain failed for {symbol}")]
    Exhausted { symbol: String },
}

/// Sampling interval for price bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minutes(u32),
    Hours(u32),
    Days(u32),
}

impl Interval {
    pub const HOURLY: Interval = Interval::Hours(1);

    pub fn seconds(&self) -> u64 {
        match self {
            Interval::Minutes(n) => *n as u64 * 60,
            Interval::Hours(n) => *n as u64 * 3600,
            Interval::Days(n) => *n as u64 * 86_400,
        }
    }
}

impl fmt::Display for Interval {
    /// Exchange-style shorthand: "30m", "1h", "1d".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Minutes(n) => write!(f, "{n}m"),
            Interval::Hours(n) => write!(f, "{n}h"),
            Interval::Days(n) => write!(f, "{n}d"),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    /// Parse "30m" / "1h" / "1d"; a bare number means hours.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty interval".into());
        }
        let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
            Some(pos) => s.split_at(pos),
            None => (s, "h"),
        };
        let n: u32 = digits
            .parse()
            .map_err(|_| format!("bad interval number in {s:?}"))?;
        if n == 0 {
            return Err(format!("zero-length interval {s:?}"));
        }
        match unit {
            "m" => Ok(Interval::Minutes(n)),
            "h" => Ok(Interval::Hours(n)),
            "d" => Ok(Interval::Days(n)),
            other => Err(format!("unknown interval unit {other:?}")),
        }
    }
}

/// A source of historical price bars.
pub trait PriceFeed: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch up to `limit` bars for `symbol`, oldest first.
    fn fetch(&self, symbol: &str, interval: Interval, limit: usize)
        -> Result<Vec<PriceBar>, FeedError>;
}
