//! Regressor dispatch over the supported model kinds.

use super::boosted::BoostedTreesRegressor;
use super::config::{ModelConfig, ModelKind};
use super::forest::{ForestParams, ForestRegressor};
use super::linear::LinearRegressor;
use serde::{Deserialize, Serialize};

/// Confidence reported by model kinds without a native uncertainty signal.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Forest(ForestRegressor),
    BoostedTrees(BoostedTreesRegressor),
    Linear(LinearRegressor),
}

impl Regressor {
    /// Fresh, unfitted instance for the configured kind.
    pub fn from_config(config: &ModelConfig) -> Self {
        match config.kind {
            ModelKind::Forest => Regressor::Forest(ForestRegressor::new(ForestParams {
                seed: config.seed,
                ..config.forest.clone()
            })),
            ModelKind::BoostedTrees => {
                Regressor::BoostedTrees(BoostedTreesRegressor::new(config.boosted.clone()))
            }
            ModelKind::Linear => Regressor::Linear(LinearRegressor::new()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Regressor::Forest(_) => ModelKind::Forest,
            Regressor::BoostedTrees(_) => ModelKind::BoostedTrees,
            Regressor::Linear(_) => ModelKind::Linear,
        }
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        match self {
            Regressor::Forest(m) => m.fit(x, y),
            Regressor::BoostedTrees(m) => m.fit(x, y),
            Regressor::Linear(m) => m.fit(x, y),
        }
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        match self {
            Regressor::Forest(m) => m.predict_one(features),
            Regressor::BoostedTrees(m) => m.predict_one(features),
            Regressor::Linear(m) => m.predict_one(features),
        }
    }

    /// Confidence in [0, 1] for a prediction on `features`.
    ///
    /// Tree ensembles derive it from prediction dispersion:
    /// 1 - stdev/mean over per-tree outputs, clamped. Other kinds report
    /// [`DEFAULT_CONFIDENCE`].
    pub fn confidence(&self, features: &[f64]) -> f64 {
        match self {
            Regressor::Forest(m) => {
                let preds = m.tree_predictions(features);
                if preds.is_empty() {
                    return DEFAULT_CONFIDENCE;
                }
                let mean = preds.iter().sum::<f64>() / preds.len() as f64;
                if mean.abs() < f64::EPSILON {
                    return DEFAULT_CONFIDENCE;
                }
                let var =
                    preds.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / preds.len() as f64;
                (1.0 - var.sqrt() / mean).clamp(0.0, 1.0)
            }
            Regressor::BoostedTrees(_) | Regressor::Linear(_) => DEFAULT_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..60).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| r[0] * 2.0 + 1.0).collect();
        (x, y)
    }

    #[test]
    fn from_config_matches_kind() {
        for kind in [ModelKind::Forest, ModelKind::BoostedTrees, ModelKind::Linear] {
            let config = ModelConfig {
                kind,
                ..Default::default()
            };
            assert_eq!(Regressor::from_config(&config).kind(), kind);
        }
    }

    #[test]
    fn forest_confidence_tightens_on_clean_data() {
        let (x, y) = simple_data();
        let mut model = Regressor::from_config(&ModelConfig::default());
        model.fit(&x, &y);
        let c = model.confidence(&[30.0]);
        assert!((0.0..=1.0).contains(&c));
        // agreement among trees on smooth training data should be high
        assert!(c > 0.5, "confidence {c}");
    }

    #[test]
    fn linear_confidence_is_the_default() {
        let (x, y) = simple_data();
        let mut model = Regressor::from_config(&ModelConfig {
            kind: ModelKind::Linear,
            ..Default::default()
        });
        model.fit(&x, &y);
        assert_eq!(model.confidence(&[10.0]), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn tagged_serialization_roundtrips() {
        let (x, y) = simple_data();
        let mut model = Regressor::from_config(&ModelConfig {
            kind: ModelKind::Linear,
            ..Default::default()
        });
        model.fit(&x, &y);
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"kind\":\"linear\""));
        let loaded: Regressor = serde_json::from_str(&json).unwrap();
        assert_eq!(model.predict_one(&[7.0]), loaded.predict_one(&[7.0]));
    }
}
