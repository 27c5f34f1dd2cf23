//! Price forecasting over assembled feature tables.
//!
//! The forecaster owns the full train/predict lifecycle: feature selection,
//! scaling, target shifting, artifact persistence, and the fallback path
//! that trains a throwaway model when nothing has been persisted yet.

use super::config::ModelConfig;
use super::regressor::Regressor;
use super::scaler::StandardScaler;
use super::store::{ModelBundle, ModelStore, StoreError};
use crate::domain::Forecast;
use crate::features::FeatureTable;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model configuration invalid: {0}")]
    Configuration(String),
    #[error("training failed: {0}")]
    Training(String),
    #[error("no data available for forecasting: {0}")]
    DataUnavailable(String),
    #[error("artifact persistence failed")]
    Persistence(#[from] StoreError),
}

/// Feature matrix and shifted target, scaled and ready to fit.
#[derive(Debug)]
pub struct PreparedData {
    pub feature_names: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    pub scaler: StandardScaler,
}

#[derive(Debug)]
pub struct Forecaster {
    config: ModelConfig,
    store: ModelStore,
    fitted: Option<(Regressor, StandardScaler)>,
}

impl Forecaster {
    pub fn new(config: ModelConfig, store: ModelStore) -> Self {
        Self {
            config,
            store,
            fitted: None,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Build the training matrix from `table`.
    ///
    /// Configured feature columns absent from the table are skipped; an
    /// empty intersection is a configuration error. The target column is
    /// shifted `horizon` steps so row i predicts the value at i + horizon,
    /// and the matrix is truncated to the shifted target's length. The
    /// scaler is refit on every call, so train and predict always scale
    /// against the data currently in view.
    pub fn prepare(&self, table: &FeatureTable) -> Result<PreparedData, ModelError> {
        if table.is_empty() {
            return Err(ModelError::DataUnavailable("empty feature table".into()));
        }

        let feature_names: Vec<String> = self
            .config
            .features
            .iter()
            .filter(|name| table.column(name).is_some())
            .cloned()
            .collect();
        if feature_names.is_empty() {
            return Err(ModelError::Configuration(format!(
                "none of the configured features {:?} exist in the table",
                self.config.features
            )));
        }

        let target = table.column(&self.config.target).ok_or_else(|| {
            ModelError::Configuration(format!(
                "target column {:?} missing from table",
                self.config.target
            ))
        })?;

        let horizon = self.config.horizon.max(1);
        if table.len() <= horizon {
            return Err(ModelError::DataUnavailable(format!(
                "{} rows cannot support a horizon of {horizon}",
                table.len()
            )));
        }

        // y[i] is the target horizon steps after row i.
        let y: Vec<f64> = target[horizon..].to_vec();
        let rows = y.len();

        let mut x = Vec::with_capacity(rows);
        for i in 0..rows {
            let row: Vec<f64> = feature_names
                .iter()
                .map(|name| table.column(name).map(|c| c[i]).unwrap_or(0.0))
                .collect();
            x.push(row);
        }

        let (scaler, x) = StandardScaler::fit_transform(&x);
        Ok(PreparedData {
            feature_names,
            x,
            y,
            scaler,
        })
    }

    /// Train on `table`, persist the artifacts, and keep the fitted model in
    /// memory. Returns the artifact stem.
    pub fn train(&mut self, table: &FeatureTable) -> Result<String, ModelError> {
        let prepared = self.prepare(table)?;
        if prepared.x.len() < self.config.lookback_window {
            return Err(ModelError::Training(format!(
                "{} prepared rows, need at least {}",
                prepared.x.len(),
                self.config.lookback_window
            )));
        }

        // Holdout score on the trailing split, then refit on everything.
        let split = ((prepared.x.len() as f64) * self.config.train_fraction) as usize;
        if split > 0 && split < prepared.x.len() {
            let mut holdout = Regressor::from_config(&self.config);
            holdout.fit(&prepared.x[..split], &prepared.y[..split]);
            let mse: f64 = prepared.x[split..]
                .iter()
                .zip(&prepared.y[split..])
                .map(|(row, target)| (holdout.predict_one(row) - target).powi(2))
                .sum::<f64>()
                / (prepared.x.len() - split) as f64;
            info!(
                kind = self.config.kind.as_str(),
                holdout_rows = prepared.x.len() - split,
                holdout_mse = mse,
                "holdout evaluation"
            );
        }

        let mut regressor = Regressor::from_config(&self.config);
        regressor.fit(&prepared.x, &prepared.y);

        let bundle = ModelBundle {
            regressor,
            scaler: prepared.scaler,
            config: self.config.clone(),
        };
        let stem = self.store.save(&bundle)?;
        info!(
            stem,
            rows = prepared.x.len(),
            features = ?prepared.feature_names,
            "model trained"
        );
        self.fitted = Some((bundle.regressor, bundle.scaler));
        Ok(stem)
    }

    /// Forecast the target `horizon` steps past the end of `table`.
    ///
    /// Uses the in-memory model if one exists, otherwise loads the latest
    /// persisted artifacts. With neither available a minimal model is fit on
    /// the table itself so a cycle never dies for lack of training history.
    pub fn predict(&mut self, table: &FeatureTable) -> Result<Forecast, ModelError> {
        let current = table
            .last_close()
            .ok_or_else(|| ModelError::DataUnavailable("no close prices".into()))?;

        self.ensure_model(table)?;
        let prepared = self.prepare(table)?;
        let (regressor, _) = self
            .fitted
            .as_ref()
            .ok_or_else(|| ModelError::Training("no fitted model".into()))?;

        let last_row = prepared
            .x
            .last()
            .ok_or_else(|| ModelError::DataUnavailable("prepared matrix is empty".into()))?;
        let prediction = regressor.predict_one(last_row);
        if !prediction.is_finite() {
            return Err(ModelError::Training(
                "model produced a non-finite prediction".into(),
            ));
        }
        let confidence = regressor.confidence(last_row);

        Ok(Forecast::new(
            current,
            prediction,
            confidence,
            self.config.horizon,
        ))
    }

    fn ensure_model(&mut self, table: &FeatureTable) -> Result<(), ModelError> {
        if self.fitted.is_some() {
            return Ok(());
        }
        match self.store.load_latest() {
            Ok(bundle) => {
                self.fitted = Some((bundle.regressor, bundle.scaler));
                Ok(())
            }
            Err(StoreError::NoSavedModel(_)) => {
                warn!("no persisted model, fitting an emergency model on current data");
                self.emergency_fit(table)
            }
            Err(e) => Err(ModelError::Persistence(e)),
        }
    }

    /// Last-resort fit when nothing is persisted: train on whatever rows the
    /// table has, substituting a jittered copy of the closes as target when
    /// the horizon shift leaves too little to work with.
    fn emergency_fit(&mut self, table: &FeatureTable) -> Result<(), ModelError> {
        let prepared = match self.prepare(table) {
            Ok(p) => p,
            Err(ModelError::DataUnavailable(_)) => {
                return Err(ModelError::Training(
                    "not enough data for even an emergency fit".into(),
                ))
            }
            Err(e) => return Err(e),
        };

        let mut regressor = Regressor::from_config(&self.config);
        if prepared.y.iter().all(|&v| v == prepared.y[0]) {
            // Degenerate constant target; jitter so tree splits exist.
            let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
            let y: Vec<f64> = prepared
                .y
                .iter()
                .map(|v| v * (1.0 + rng.gen_range(-0.01..0.01)))
                .collect();
            regressor.fit(&prepared.x, &y);
        } else {
            regressor.fit(&prepared.x, &prepared.y);
        }
        self.fitted = Some((regressor, prepared.scaler));
        Ok(())
    }
}
