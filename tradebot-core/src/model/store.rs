//! On-disk model artifacts.
//!
//! A training run persists three JSON files sharing a timestamped stem:
//! `{kind}_{YYYYmmdd_HHMMSS}.model.json`, `.scaler.json` and `.config.json`.
//! Loading the "latest" model picks the lexicographically greatest stem,
//! which the timestamp format makes chronological.

use super::config::ModelConfig;
use super::regressor::Regressor;
use super::scaler::StandardScaler;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MODEL_SUFFIX: &str = ".model.json";
const SCALER_SUFFIX: &str = ".scaler.json";
const CONFIG_SUFFIX: &str = ".config.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("artifact i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifact {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no saved model found under {0}")]
    NoSavedModel(PathBuf),
}

/// A fitted model together with the scaler and config it was trained with.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub regressor: Regressor,
    pub scaler: StandardScaler,
    pub config: ModelConfig,
}

/// Directory of persisted model artifacts.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a bundle under a fresh timestamped stem and return the stem.
    pub fn save(&self, bundle: &ModelBundle) -> Result<String, StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let stem = format!(
            "{}_{}",
            bundle.config.kind.as_str(),
            Utc::now().format("%Y%m%d_%H%M%S")
        );

        self.write_json(&stem, MODEL_SUFFIX, &bundle.regressor)?;
        self.write_json(&stem, SCALER_SUFFIX, &bundle.scaler)?;
        self.write_json(&stem, CONFIG_SUFFIX, &bundle.config)?;

        info!(stem, dir = %self.dir.display(), "saved model artifacts");
        Ok(stem)
    }

    /// Load the bundle saved under `stem`.
    pub fn load(&self, stem: &str) -> Result<ModelBundle, StoreError> {
        Ok(ModelBundle {
            regressor: self.read_json(stem, MODEL_SUFFIX)?,
            scaler: self.read_json(stem, SCALER_SUFFIX)?,
            config: self.read_json(stem, CONFIG_SUFFIX)?,
        })
    }

    /// Load the most recently saved bundle, by stem ordering.
    pub fn load_latest(&self) -> Result<ModelBundle, StoreError> {
        let stem = self
            .latest_stem()?
            .ok_or_else(|| StoreError::NoSavedModel(self.dir.clone()))?;
        debug!(stem, "loading latest model artifacts");
        self.load(&stem)
    }

    /// Greatest stem that has a model file, or None for an empty store.
    pub fn latest_stem(&self) -> Result<Option<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut best: Option<String> = None;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(MODEL_SUFFIX) else {
                continue;
            };
            if best.as_deref().map(|b| stem > b).unwrap_or(true) {
                best = Some(stem.to_string());
            }
        }
        Ok(best)
    }

    fn path(&self, stem: &str, suffix: &str) -> PathBuf {
        self.dir.join(format!("{stem}{suffix}"))
    }

    fn write_json<T: serde::Serialize>(
        &self,
        stem: &str,
        suffix: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.path(stem, suffix);
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Malformed {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StoreError::Io { path, source })
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        stem: &str,
        suffix: &str,
    ) -> Result<T, StoreError> {
        let path = self.path(stem, suffix);
        let bytes = fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::ModelKind;

    fn fitted_bundle(kind: ModelKind) -> ModelBundle {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| r[0] + 1.0).collect();
        let config = ModelConfig {
            kind,
            ..Default::default()
        };
        let mut regressor = Regressor::from_config(&config);
        regressor.fit(&x, &y);
        ModelBundle {
            regressor,
            scaler: StandardScaler::fit(&x),
            config,
        }
    }

    #[test]
    fn save_then_load_preserves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let bundle = fitted_bundle(ModelKind::Linear);
        let stem = store.save(&bundle).unwrap();
        assert!(stem.starts_with("linear_"));

        let loaded = store.load(&stem).unwrap();
        assert_eq!(
            bundle.regressor.predict_one(&[5.0]),
            loaded.regressor.predict_one(&[5.0])
        );
        assert_eq!(bundle.scaler.means, loaded.scaler.means);
    }

    #[test]
    fn latest_picks_the_greatest_stem() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let bundle = fitted_bundle(ModelKind::Linear);

        // Hand-written stems stand in for successive training runs.
        for stem in ["linear_20240101_000000", "linear_20250601_120000"] {
            store.write_json(stem, MODEL_SUFFIX, &bundle.regressor).unwrap();
            store.write_json(stem, SCALER_SUFFIX, &bundle.scaler).unwrap();
            store.write_json(stem, CONFIG_SUFFIX, &bundle.config).unwrap();
        }

        assert_eq!(
            store.latest_stem().unwrap().as_deref(),
            Some("linear_20250601_120000")
        );
        assert!(store.load_latest().is_ok());
    }

    #[test]
    fn empty_store_reports_no_saved_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("missing"));
        assert!(matches!(
            store.load_latest(),
            Err(StoreError::NoSavedModel(_))
        ));
    }

    #[test]
    fn corrupt_artifact_is_reported_as_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        std::fs::write(dir.path().join("linear_20250101_000000.model.json"), b"{oops").unwrap();
        assert!(matches!(
            store.load("linear_20250101_000000"),
            Err(StoreError::Malformed { .. })
        ));
    }
}
