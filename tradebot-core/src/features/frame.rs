//! Feature table types.
//!
//! `RawTable` is the loosely-keyed boundary type fed by upstream sources
//! (CSV headers may be capitalized, exchange feeds lowercase). Everything
//! after the assembler is fixed-schema: `FeatureFrame` holds
//! optional-at-construction columns, and `fill()` produces a `FeatureTable`
//! whose columns are total — no NaN, no absent fields.

use crate::domain::PriceBar;
use std::collections::BTreeMap;

/// Canonical feature column names, in schema order.
pub const COLUMN_NAMES: [&str; 10] = [
    "close",
    "volume",
    "rsi",
    "macd",
    "macd_signal",
    "ema_short",
    "ema_medium",
    "ema_long",
    "volatility",
    "sentiment",
];

/// Loosely-keyed numeric table from an upstream source.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    columns: BTreeMap<String, Vec<f64>>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bars(bars: &[PriceBar]) -> Self {
        let mut table = Self::new();
        table.insert("open", bars.iter().map(|b| b.open).collect());
        table.insert("high", bars.iter().map(|b| b.high).collect());
        table.insert("low", bars.iter().map(|b| b.low).collect());
        table.insert("close", bars.iter().map(|b| b.close).collect());
        table.insert("volume", bars.iter().map(|b| b.volume).collect());
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Lowercase every column name. When both spellings exist the lowercase
    /// one wins, matching the upstream convention that lowercase columns are
    /// already canonical.
    pub fn canonicalize(&mut self) {
        let keys: Vec<String> = self.columns.keys().cloned().collect();
        for key in keys {
            let lower = key.to_lowercase();
            if lower != key {
                if let Some(values) = self.columns.remove(&key) {
                    self.columns.entry(lower).or_insert(values);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(|v| v.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assembled features before missing-value resolution. Indicator columns are
/// optional: an indicator that failed upstream simply never set its column.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    pub len: usize,
    pub close: Vec<f64>,
    pub volume: Option<Vec<f64>>,
    pub rsi: Option<Vec<f64>>,
    pub macd: Option<Vec<f64>>,
    pub macd_signal: Option<Vec<f64>>,
    pub ema_short: Option<Vec<f64>>,
    pub ema_medium: Option<Vec<f64>>,
    pub ema_long: Option<Vec<f64>>,
    pub volatility: Option<Vec<f64>>,
    pub sentiment: Option<Vec<f64>>,
}

impl FeatureFrame {
    pub fn new(close: Vec<f64>) -> Self {
        let len = close.len();
        Self {
            len,
            close,
            volume: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            ema_short: None,
            ema_medium: None,
            ema_long: None,
            volatility: None,
            sentiment: None,
        }
    }

    /// Resolve every hole: forward-fill, then backward-fill, then zero, in
    /// that fixed order, applied per column. Absent columns become all-zero.
    /// The result is total — `FeatureTable` contains no NaN.
    pub fn fill(self) -> FeatureTable {
        let len = self.len;
        let resolve = |col: Option<Vec<f64>>| -> Vec<f64> {
            match col {
                Some(mut v) => {
                    fill_column(&mut v);
                    v
                }
                None => vec![0.0; len],
            }
        };

        let mut close = self.close;
        fill_column(&mut close);

        FeatureTable {
            len,
            close,
            volume: resolve(self.volume),
            rsi: resolve(self.rsi),
            macd: resolve(self.macd),
            macd_signal: resolve(self.macd_signal),
            ema_short: resolve(self.ema_short),
            ema_medium: resolve(self.ema_medium),
            ema_long: resolve(self.ema_long),
            volatility: resolve(self.volatility),
            sentiment: resolve(self.sentiment),
        }
    }
}

/// Forward-fill, backward-fill, then default-to-zero, in place.
fn fill_column(values: &mut [f64]) {
    let mut last_finite: Option<f64> = None;
    for v in values.iter_mut() {
        if v.is_finite() {
            last_finite = Some(*v);
        } else if let Some(fill) = last_finite {
            *v = fill;
        }
    }
    let mut next_finite: Option<f64> = None;
    for v in values.iter_mut().rev() {
        if v.is_finite() {
            next_finite = Some(*v);
        } else if let Some(fill) = next_finite {
            *v = fill;
        }
    }
    for v in values.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
        }
    }
}

/// Fully-resolved feature table: fixed schema, every value defined.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    len: usize,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub ema_short: Vec<f64>,
    pub ema_medium: Vec<f64>,
    pub ema_long: Vec<f64>,
    pub volatility: Vec<f64>,
    pub sentiment: Vec<f64>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up a column by canonical name. Unknown names return None and are
    /// rejected by the model's feature selection.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        match name {
            "close" => Some(&self.close),
            "volume" => Some(&self.volume),
            "rsi" => Some(&self.rsi),
            "macd" => Some(&self.macd),
            "macd_signal" => Some(&self.macd_signal),
            "ema_short" => Some(&self.ema_short),
            "ema_medium" => Some(&self.ema_medium),
            "ema_long" => Some(&self.ema_long),
            "volatility" => Some(&self.volatility),
            "sentiment" => Some(&self.sentiment),
            _ => None,
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }

    /// Per-row view of the derived features.
    pub fn record(&self, index: usize) -> Option<FeatureRecord> {
        if index >= self.len {
            return None;
        }
        Some(FeatureRecord {
            rsi: self.rsi[index],
            macd: self.macd[index],
            macd_signal: self.macd_signal[index],
            ema_short: self.ema_short[index],
            ema_medium: self.ema_medium[index],
            ema_long: self.ema_long[index],
            volatility: self.volatility[index],
            sentiment: self.sentiment[index],
        })
    }

    /// Keep only the trailing `window` rows, as an owned copy.
    pub fn tail(&self, window: usize) -> FeatureTable {
        let start = self.len.saturating_sub(window);
        let cut = |v: &Vec<f64>| v[start..].to_vec();
        FeatureTable {
            len: self.len - start,
            close: cut(&self.close),
            volume: cut(&self.volume),
            rsi: cut(&self.rsi),
            macd: cut(&self.macd),
            macd_signal: cut(&self.macd_signal),
            ema_short: cut(&self.ema_short),
            ema_medium: cut(&self.ema_medium),
            ema_long: cut(&self.ema_long),
            volatility: cut(&self.volatility),
            sentiment: cut(&self.sentiment),
        }
    }

    /// True if any column contains a non-finite value. Post-fill tables must
    /// never trip this.
    pub fn has_undefined(&self) -> bool {
        COLUMN_NAMES.iter().any(|name| {
            self.column(name)
                .map(|col| col.iter().any(|v| !v.is_finite()))
                .unwrap_or(false)
        })
    }
}

/// One row of derived features. Every field is defined — the fill policy
/// runs before records are exposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRecord {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub ema_short: f64,
    pub ema_medium: f64,
    pub ema_long: f64,
    pub volatility: f64,
    pub sentiment: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_lowercases_yahoo_style_headers() {
        let mut table = RawTable::new();
        table.insert("Close", vec![1.0, 2.0]);
        table.insert("Volume", vec![10.0, 20.0]);
        table.canonicalize();
        assert!(table.column("close").is_some());
        assert!(table.column("Close").is_none());
    }

    #[test]
    fn canonicalize_prefers_existing_lowercase() {
        let mut table = RawTable::new();
        table.insert("close", vec![1.0]);
        table.insert("Close", vec![99.0]);
        table.canonicalize();
        assert_eq!(table.column("close").unwrap(), &[1.0]);
    }

    #[test]
    fn fill_order_is_ffill_then_bfill_then_zero() {
        let mut frame = FeatureFrame::new(vec![1.0, 2.0, 3.0, 4.0]);
        // gap in the middle -> forward fill wins
        frame.rsi = Some(vec![10.0, f64::NAN, f64::NAN, 40.0]);
        // leading gap -> backward fill
        frame.macd = Some(vec![f64::NAN, 5.0, 6.0, 7.0]);
        // entirely missing -> zeros
        let table = frame.fill();

        assert_eq!(table.rsi, vec![10.0, 10.0, 10.0, 40.0]);
        assert_eq!(table.macd, vec![5.0, 5.0, 6.0, 7.0]);
        assert_eq!(table.volatility, vec![0.0; 4]);
        assert!(!table.has_undefined());
    }

    #[test]
    fn tail_is_an_independent_copy() {
        let frame = FeatureFrame::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let table = frame.fill();
        let mut tail = table.tail(2);
        assert_eq!(tail.close, vec![4.0, 5.0]);
        tail.close[0] = 999.0;
        assert_eq!(table.close[3], 4.0);
    }

    #[test]
    fn tail_longer_than_table_returns_everything() {
        let table = FeatureFrame::new(vec![1.0, 2.0]).fill();
        assert_eq!(table.tail(48).len(), 2);
    }

    #[test]
    fn record_exposes_all_fields() {
        let mut frame = FeatureFrame::new(vec![1.0, 2.0]);
        frame.rsi = Some(vec![50.0, 60.0]);
        frame.sentiment = Some(vec![0.1, 0.1]);
        let table = frame.fill();
        let rec = table.record(1).unwrap();
        assert_eq!(rec.rsi, 60.0);
        assert_eq!(rec.sentiment, 0.1);
        assert!(table.record(2).is_none());
    }

    #[test]
    fn unknown_column_is_rejected() {
        let table = FeatureFrame::new(vec![1.0]).fill();
        assert!(table.column("bollinger").is_none());
    }
}
