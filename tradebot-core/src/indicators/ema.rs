//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! with alpha = 2 / (span + 1), seeded from the first observation.
//! The decay is unbounded — every past value contributes with geometrically
//! decreasing weight. This is not a fixed-length window average.

use super::{check_finite, IndicatorError};

/// Compute EMA over `closes` for the given span.
pub fn ema(closes: &[f64], span: usize) -> Result<Vec<f64>, IndicatorError> {
    check_finite(closes)?;
    let span = span.max(1);
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut out = Vec::with_capacity(closes.len());
    let mut prev = closes[0];
    out.push(prev);
    for &close in &closes[1..] {
        prev = alpha * close + (1.0 - alpha) * prev;
        out.push(prev);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn span_1_equals_input() {
        let out = ema(&[100.0, 200.0, 300.0], 1).unwrap();
        assert_eq!(out, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn known_values_span_3() {
        // alpha = 2/(3+1) = 0.5, seeded at 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        let out = ema(&[10.0, 11.0, 12.0], 3).unwrap();
        assert_approx(out[0], 10.0, DEFAULT_EPSILON);
        assert_approx(out[1], 10.5, DEFAULT_EPSILON);
        assert_approx(out[2], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_series_stays_constant() {
        let out = ema(&[42.0; 100], 12).unwrap();
        for &v in &out {
            assert_approx(v, 42.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn empty_input_errors() {
        assert_eq!(ema(&[], 12), Err(IndicatorError::EmptyInput));
    }

    #[test]
    fn nan_input_errors() {
        assert_eq!(ema(&[1.0, f64::NAN], 12), Err(IndicatorError::NonFinite(1)));
    }
}
