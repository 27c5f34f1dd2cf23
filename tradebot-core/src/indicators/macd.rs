//! Moving Average Convergence Divergence (MACD).
//!
//! MACD = EMA(fast) - EMA(slow); signal = EMA(MACD, span = signal_span).

use super::ema::ema;
use super::IndicatorError;

/// MACD line plus its signal line, one value per input close.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> Result<MacdSeries, IndicatorError> {
    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal_span)?;
    Ok(MacdSeries { macd: line, signal })
}
