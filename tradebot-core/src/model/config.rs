//! Forecast model configuration.

use super::boosted::BoostedParams;
use super::forest::ForestParams;
use serde::{Deserialize, Serialize};

/// Which regressor family backs the forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Forest,
    BoostedTrees,
    Linear,
}

impl ModelKind {
    /// Stable name used in persisted artifact stems.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Forest => "forest",
            ModelKind::BoostedTrees => "boosted_trees",
            ModelKind::Linear => "linear",
        }
    }
}

/// Serializable model configuration, persisted alongside each training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Feature columns requested, by canonical name. Only columns actually
    /// present in the table are used; an empty intersection is a
    /// configuration error.
    pub features: Vec<String>,
    /// Target column; the forecast is this column `horizon` steps ahead.
    pub target: String,
    pub horizon: usize,
    /// Minimum prepared rows required for a regular training run.
    pub lookback_window: usize,
    /// Fraction of rows used for fitting when a holdout score is computed.
    pub train_fraction: f64,
    pub forest: ForestParams,
    pub boosted: BoostedParams,
    /// Seed for every stochastic path (bootstrap, emergency-fit target).
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Forest,
            features: vec![
                "close".into(),
                "volume".into(),
                "rsi".into(),
                "macd".into(),
                "sentiment".into(),
                "ema_short".into(),
                "ema_medium".into(),
                "volatility".into(),
            ],
            target: "close".into(),
            horizon: 1,
            lookback_window: 24,
            train_fraction: 0.8,
            forest: ForestParams::default(),
            boosted: BoostedParams::default(),
            seed: 42,
        }
    }
}
