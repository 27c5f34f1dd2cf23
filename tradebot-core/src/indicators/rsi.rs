//! Relative Strength Index (RSI).
//!
//! Rolling-window averages of gains and losses (not Wilder smoothing):
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss) over a trailing window of
//! `period` deltas. A zero average on either side is replaced by a small
//! epsilon, so a flat series lands exactly on the neutral 50.
//!
//! Early bars are computed from whatever trailing deltas exist rather than
//! left undefined; the very first bar has no delta and reads 50.

use super::{check_finite, IndicatorError};

/// Zero-average substitute that keeps RS defined (and equal to 1 when both
/// sides are flat).
const EPSILON: f64 = 1e-5;

/// Which path produced the series. Lets tests assert that the neutral
/// fallback actually ran instead of just observing the absence of a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiPath {
    Computed,
    NeutralFallback,
}

/// RSI output: values in [0, 100], one per input close.
#[derive(Debug, Clone)]
pub struct RsiSeries {
    pub values: Vec<f64>,
    pub path: RsiPath,
}

/// Compute RSI over `closes` with the given trailing window.
///
/// Never fails: any computation error degrades to a constant neutral series
/// of 50, tagged as [`RsiPath::NeutralFallback`].
pub fn rsi(closes: &[f64], period: usize) -> RsiSeries {
    match rsi_inner(closes, period) {
        Ok(values) => RsiSeries {
            values,
            path: RsiPath::Computed,
        },
        Err(err) => {
            tracing::warn!(%err, "RSI computation failed, emitting neutral series");
            RsiSeries {
                values: vec![50.0; closes.len().max(1)],
                path: RsiPath::NeutralFallback,
            }
        }
    }
}

fn rsi_inner(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_finite(closes)?;
    let period = period.max(1);
    let n = closes.len();

    // deltas[i] is the change into bar i; bar 0 has none.
    let mut deltas = vec![0.0; n];
    for i in 1..n {
        deltas[i] = closes[i] - closes[i - 1];
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        // Trailing window of up to `period` deltas ending at bar i.
        // Deltas only exist from bar 1, so early bars use a partial window
        // and bar 0 uses none at all.
        let window: &[f64] = if i == 0 {
            &[]
        } else {
            let start = (i + 1).saturating_sub(period).max(1);
            &deltas[start..=i]
        };
        let (mut gains, mut losses) = (0.0, 0.0);
        for &d in window {
            if d > 0.0 {
                gains += d;
            } else {
                losses -= d;
            }
        }
        let denom = window.len().max(1) as f64;
        let mut avg_gain = gains / denom;
        let mut avg_loss = losses / denom;
        if avg_gain == 0.0 {
            avg_gain = EPSILON;
        }
        if avg_loss == 0.0 {
            avg_loss = EPSILON;
        }
        out.push(100.0 - 100.0 / (1.0 + avg_gain / avg_loss));
    }
    Ok(out)
}
