//! Zero-mean / unit-variance feature scaling.

use serde::{Deserialize, Serialize};

/// Per-column standardization: (x - mean) / std.
///
/// Columns with zero variance pass through centered only (std treated as 1),
/// so constant features don't blow up to infinity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major samples. Every row must have the same width.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        if n == 0 {
            return Self::default();
        }
        let width = rows[0].len();
        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n as f64;
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n as f64).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Self { means, stds }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    pub fn fit_transform(rows: &[Vec<f64>]) -> (Self, Vec<Vec<f64>>) {
        let scaler = Self::fit(rows);
        let scaled = scaler.transform(rows);
        (scaler, scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_columns_have_zero_mean_unit_variance() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let (_, scaled) = StandardScaler::fit_transform(&rows);

        for col in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[col]).sum::<f64>() / 3.0;
            let var: f64 = scaled.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let rows = vec![vec![5.0], vec![5.0], vec![5.0]];
        let (_, scaled) = StandardScaler::fit_transform(&rows);
        assert!(scaled.iter().all(|r| r[0] == 0.0));
    }

    #[test]
    fn roundtrips_through_json() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let json = serde_json::to_string(&scaler).unwrap();
        let loaded: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(scaler.means, loaded.means);
        assert_eq!(scaler.stds, loaded.stds);
    }
}
