//! PriceBar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one sampling interval.
///
/// Bars arrive from a price feed as an ordered sequence with strictly
/// increasing timestamps and no duplicates. Volume is fractional because
/// crypto venues report partial-unit volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Basic OHLCV sanity check: high >= low, prices positive, no NaN.
    pub fn is_sane(&self) -> bool {
        if self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Check that a bar series is ordered by strictly increasing timestamp.
pub fn is_strictly_ordered(bars: &[PriceBar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}
