//! Rolling volatility: trailing-window standard deviation of close prices.
//!
//! Sample standard deviation (n - 1 denominator) over a fixed-length window.
//! Bars before the window has filled read NaN; the feature-assembler fill
//! policy resolves them downstream.

use super::{check_finite, IndicatorError};

pub fn rolling_volatility(closes: &[f64], window: usize) -> Result<Vec<f64>, IndicatorError> {
    check_finite(closes)?;
    let window = window.max(2);
    let n = closes.len();
    let mut out = vec![f64::NAN; n];

    for i in (window - 1)..n {
        let slice = &closes[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        out[i] = var.sqrt();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn warmup_is_nan_then_defined() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rolling_volatility(&closes, 24).unwrap();
        assert!(out[22].is_nan());
        assert!(out[23].is_finite());
    }

    #[test]
    fn constant_series_has_zero_volatility() {
        let out = rolling_volatility(&[100.0; 30], 24).unwrap();
        assert_approx(out[29], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn known_sample_std() {
        // window [1, 2, 3, 4]: mean 2.5, sample var 5/3
        let out = rolling_volatility(&[1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_approx(out[3], (5.0f64 / 3.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn never_negative() {
        let closes = [100.0, 90.0, 110.0, 95.0, 105.0, 85.0, 115.0];
        let out = rolling_volatility(&closes, 3).unwrap();
        for &v in &out {
            if v.is_finite() {
                assert!(v >= 0.0);
            }
        }
    }
}
