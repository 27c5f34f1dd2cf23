//! Gradient-boosted regression stumps.
//!
//! Each round fits a depth-1 tree to the residuals of the running prediction
//! and adds it scaled by the learning rate. Deliberately simple — the hourly
//! feature window is small and shallow learners generalize better on it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostedParams {
    pub n_rounds: usize,
    pub learning_rate: f64,
}

impl Default for BoostedParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
        }
    }
}

/// One split with constant predictions on either side.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stump {
    feature_idx: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

impl Stump {
    fn predict(&self, features: &[f64]) -> f64 {
        if features.get(self.feature_idx).copied().unwrap_or(0.0) <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedTreesRegressor {
    params: BoostedParams,
    base: f64,
    stumps: Vec<Stump>,
}

impl BoostedTreesRegressor {
    pub fn new(params: BoostedParams) -> Self {
        Self {
            params,
            base: 0.0,
            stumps: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        self.stumps.clear();
        if x.is_empty() || y.is_empty() {
            self.base = 0.0;
            return;
        }
        self.base = y.iter().sum::<f64>() / y.len() as f64;

        let mut predictions = vec![self.base; y.len()];
        for _ in 0..self.params.n_rounds {
            let residuals: Vec<f64> = y
                .iter()
                .zip(&predictions)
                .map(|(target, pred)| target - pred)
                .collect();

            let Some(stump) = fit_stump(x, &residuals) else {
                break;
            };
            for (pred, row) in predictions.iter_mut().zip(x) {
                *pred += self.params.learning_rate * stump.predict(row);
            }
            self.stumps.push(stump);
        }
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        self.base
            + self
                .stumps
                .iter()
                .map(|s| self.params.learning_rate * s.predict(features))
                .sum::<f64>()
    }
}

/// Best single split by sum-of-squared-error reduction on the residuals.
fn fit_stump(x: &[Vec<f64>], residuals: &[f64]) -> Option<Stump> {
    let n_features = x.first()?.len();
    let mut best: Option<(f64, Stump)> = None;

    for feature_idx in 0..n_features {
        let mut values: Vec<f64> = x.iter().map(|r| r[feature_idx]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        for window in values.windows(2) {
            let threshold = (window[0] + window[1]) / 2.0;
            let (mut left_sum, mut left_n, mut right_sum, mut right_n) = (0.0, 0usize, 0.0, 0usize);
            for (row, &r) in x.iter().zip(residuals) {
                if row[feature_idx] <= threshold {
                    left_sum += r;
                    left_n += 1;
                } else {
                    right_sum += r;
                    right_n += 1;
                }
            }
            if left_n == 0 || right_n == 0 {
                continue;
            }
            let left_value = left_sum / left_n as f64;
            let right_value = right_sum / right_n as f64;

            let sse: f64 = x
                .iter()
                .zip(residuals)
                .map(|(row, &r)| {
                    let fitted = if row[feature_idx] <= threshold {
                        left_value
                    } else {
                        right_value
                    };
                    (r - fitted).powi(2)
                })
                .sum();

            if best.as_ref().map(|(score, _)| sse < *score).unwrap_or(true) {
                best = Some((
                    sse,
                    Stump {
                        feature_idx,
                        threshold,
                        left_value,
                        right_value,
                    },
                ));
            }
        }
    }
    best.map(|(_, stump)| stump)
}
