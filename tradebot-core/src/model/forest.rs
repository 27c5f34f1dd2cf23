//! Random forest regressor: bootstrapped regression trees fit in parallel.
//!
//! Besides the mean prediction, the forest exposes per-tree predictions so
//! the forecaster can turn ensemble dispersion into a confidence score.

use super::tree::{RegressionTree, TreeParams};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features per split; defaults to n_features / 3 for regression.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    params: ForestParams,
    trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let max_features = self
            .params
            .max_features
            .unwrap_or_else(|| (n_features / 3).max(1));

        self.trees = (0..self.params.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_params = TreeParams {
                    max_depth: self.params.max_depth,
                    min_samples_split: self.params.min_samples_split,
                    min_samples_leaf: self.params.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: self.params.seed.wrapping_add(i as u64),
                };
                let (bx, by) = bootstrap_sample(x, y, self.params.seed.wrapping_add(i as u64));
                let mut tree = RegressionTree::new(tree_params);
                tree.fit(&bx, &by);
                tree
            })
            .collect();
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let preds = self.tree_predictions(features);
        if preds.is_empty() {
            return 0.0;
        }
        preds.iter().sum::<f64>() / preds.len() as f64
    }

    /// Individual tree outputs for `features`, used for dispersion-based
    /// confidence.
    pub fn tree_predictions(&self, features: &[f64]) -> Vec<f64> {
        self.trees.iter().map(|t| t.predict_one(features)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn bootstrap_sample(x: &[Vec<f64>], y: &[f64], seed: u64) -> (Vec<Vec<f64>>, Vec<f64>) {
    let n = x.len();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bx = Vec::with_capacity(n);
    let mut by = Vec::with_capacity(n);
    for _ in 0..n {
        let i = rng.gen_range(0..n);
        bx.push(x[i].clone());
        by.push(y[i]);
    }
    (bx, by)
}
