//! Technical indicator engine.
//!
//! Pure functions over an ordered close-price series. Indicator math never
//! aborts the pipeline: RSI degrades to a tagged neutral series, and the
//! other indicators surface `IndicatorError` so the feature assembler can
//! leave the column absent and let the fill policy resolve it.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod volatility;

pub use ema::ema;
pub use macd::{macd, MacdSeries};
pub use rsi::{rsi, RsiSeries};
pub use volatility::rolling_volatility;

use thiserror::Error;

/// Indicator computation failure. Recovered at the assembler boundary,
/// never propagated as fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("empty input series")]
    EmptyInput,

    #[error("non-finite value at index {0}")]
    NonFinite(usize),
}

pub(crate) fn check_finite(closes: &[f64]) -> Result<(), IndicatorError> {
    if closes.is_empty() {
        return Err(IndicatorError::EmptyInput);
    }
    match closes.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(IndicatorError::NonFinite(i)),
        None => Ok(()),
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
