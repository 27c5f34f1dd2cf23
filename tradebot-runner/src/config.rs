//! Application configuration.
//!
//! One TOML file drives the whole bot. Every field has a default, so an
//! empty file (or no file at all) yields a working paper-trading setup on
//! synthetic data.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tradebot_core::decision::TradingConfig;
use tradebot_core::ledger::TieBreak;
use tradebot_core::model::ModelConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub model: ModelSection,
    pub trading: TradingConfig,
    pub ledger: LedgerConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Bar sampling interval, exchange shorthand ("30m", "1h", "1d").
    pub interval: String,
    /// Bars fetched per cycle.
    pub history_bars: usize,
    /// Skip the exchange feed entirely and run on CSV/synthetic data.
    pub offline: bool,
    /// Use only the synthetic generator, ignoring exchange and CSV feeds.
    pub synthetic: bool,
    /// Directory of per-symbol CSV files, consulted before the synthetic
    /// fallback.
    pub csv_dir: Option<PathBuf>,
    /// Seed for the synthetic feed and random sentiment.
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            interval: "1h".into(),
            history_bars: 200,
            offline: false,
            synthetic: false,
            csv_dir: None,
            seed: 42,
        }
    }
}

/// Model config plus where its artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    #[serde(flatten)]
    pub config: ModelConfig,
    pub artifact_dir: PathBuf,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            config: ModelConfig::default(),
            artifact_dir: PathBuf::from("state/models"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
    pub tie_break: TieBreak,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("state/ledger.json"),
            tie_break: TieBreak::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Time between monitoring cycles, same shorthand as bar intervals.
    pub every: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { every: "1h".into() }
    }
}

impl AppConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
