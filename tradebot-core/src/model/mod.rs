//! Price forecasting models.
//!
//! Three regressor families (random forest, boosted stumps, linear) behind a
//! single [`Forecaster`] that handles scaling, target shifting, persistence
//! and confidence scoring.

mod boosted;
mod config;
mod forecaster;
mod forest;
mod linear;
mod regressor;
mod scaler;
mod store;
mod tree;

pub use boosted::{BoostedParams, BoostedTreesRegressor};
pub use config::{ModelConfig, ModelKind};
pub use forecaster::{Forecaster, ModelError, PreparedData};
pub use forest::{ForestParams, ForestRegressor};
pub use linear::LinearRegressor;
pub use regressor::{Regressor, DEFAULT_CONFIDENCE};
pub use scaler::StandardScaler;
pub use store::{ModelBundle, ModelStore, StoreError};
