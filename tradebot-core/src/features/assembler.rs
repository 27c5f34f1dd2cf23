//! Feature assembler: raw market table -> model-ready feature window.
//!
//! Pipeline order is fixed: canonicalize column names, reconstruct a missing
//! close series, compute indicators, broadcast sentiment, resolve missing
//! values, then cut the trailing model window. Indicator failures degrade to
//! absent columns; the fill policy guarantees the output is total.

use super::frame::{FeatureFrame, FeatureTable, RawTable};
use crate::indicators::{ema, macd, rolling_volatility, rsi};

/// Assembler parameters. Defaults match the hourly pipeline: 14-bar RSI,
/// 12/26/50 EMAs, 12/26/9 MACD, 24-bar volatility, 48-bar model window.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    pub rsi_period: usize,
    pub ema_short_span: usize,
    pub ema_medium_span: usize,
    pub ema_long_span: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volatility_window: usize,
    /// Trailing rows handed to the model.
    pub window: usize,
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_short_span: 12,
            ema_medium_span: 26,
            ema_long_span: 50,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volatility_window: 24,
            window: 48,
        }
    }
}

impl FeatureAssembler {
    /// Assemble features for one batch. `sentiment` is a single scalar in
    /// [-1, 1] broadcast to every row of the batch.
    pub fn assemble(&self, raw: &RawTable, sentiment: f64) -> FeatureTable {
        let mut raw = raw.clone();
        raw.canonicalize();

        let close = match raw.column("close") {
            Some(col) if !col.is_empty() => col.to_vec(),
            _ => reconstruct_close(&raw),
        };

        let mut frame = FeatureFrame::new(close);
        // Raw columns may disagree in length; close sets the row count and
        // volume is truncated or NaN-padded to match, with fill() resolving
        // the padding.
        frame.volume = raw.column("volume").map(|v| {
            let mut v = v.to_vec();
            v.resize(frame.len, f64::NAN);
            v
        });

        // Indicator failures leave the column absent; fill() resolves it.
        let rsi_out = rsi(&frame.close, self.rsi_period);
        frame.rsi = Some(rsi_out.values);

        match macd(&frame.close, self.macd_fast, self.macd_slow, self.macd_signal) {
            Ok(series) => {
                frame.macd = Some(series.macd);
                frame.macd_signal = Some(series.signal);
            }
            Err(err) => tracing::warn!(%err, "MACD unavailable for this batch"),
        }

        frame.ema_short = ema(&frame.close, self.ema_short_span).ok();
        frame.ema_medium = ema(&frame.close, self.ema_medium_span).ok();
        frame.ema_long = ema(&frame.close, self.ema_long_span).ok();

        match rolling_volatility(&frame.close, self.volatility_window) {
            Ok(vol) => frame.volatility = Some(vol),
            Err(err) => tracing::warn!(%err, "volatility unavailable for this batch"),
        }

        frame.sentiment = Some(vec![sentiment.clamp(-1.0, 1.0); frame.len]);

        frame.fill().tail(self.window)
    }
}

/// Degrade-gracefully path for demo/offline sources that carry no close
/// column: a monotonically-drifting series anchored at the first open value,
/// or at 100.0 when even open is absent.
fn reconstruct_close(raw: &RawTable) -> Vec<f64> {
    let len = raw.len().max(1);
    let anchor = raw
        .column("open")
        .and_then(|col| col.iter().copied().find(|v| v.is_finite()))
        .unwrap_or(100.0);
    tracing::warn!(anchor, "close column absent, reconstructing drifting series");
    (0..len).map(|i| anchor * (1.0 + 0.001 * i as f64)).collect()
}
