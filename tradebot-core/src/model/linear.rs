//! Ordinary least squares linear regression.
//!
//! Solves the normal equations (X'X + λI)β = X'y with a tiny ridge term to
//! keep near-collinear feature sets (EMA families correlate heavily) from
//! producing a singular system.

use serde::{Deserialize, Serialize};

const RIDGE_LAMBDA: f64 = 1e-8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        let n = x.len();
        if n == 0 || y.len() != n {
            self.coefficients.clear();
            self.intercept = 0.0;
            return;
        }
        let width = x[0].len();
        // Design matrix with a trailing intercept column of ones.
        let cols = width + 1;

        let mut xtx = vec![vec![0.0; cols]; cols];
        let mut xty = vec![0.0; cols];
        for (row, &target) in x.iter().zip(y) {
            for a in 0..cols {
                let va = if a < width { row[a] } else { 1.0 };
                xty[a] += va * target;
                for b in 0..cols {
                    let vb = if b < width { row[b] } else { 1.0 };
                    xtx[a][b] += va * vb;
                }
            }
        }
        for (i, diag_row) in xtx.iter_mut().enumerate() {
            diag_row[i] += RIDGE_LAMBDA;
        }

        let beta = solve(xtx, xty);
        self.intercept = beta.last().copied().unwrap_or(0.0);
        self.coefficients = beta[..beta.len().saturating_sub(1)].to_vec();
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        // Pivot: largest magnitude in this column at or below the diagonal
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        let diag = a[col][col];
        if diag.abs() < 1e-12 {
            continue;
        }
        for row in (col + 1)..n {
            let factor = a[row][col] / diag;
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = if a[col][col].abs() < 1e-12 {
            0.0
        } else {
            sum / a[col][col]
        };
    }
    x
}
