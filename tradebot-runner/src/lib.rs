//! TradeBot Runner — configuration, wiring, and the monitoring schedule.

pub mod app;
pub mod config;
pub mod cycle;
pub mod scheduler;

pub use app::build_cycle;
pub use config::AppConfig;
pub use cycle::{CycleError, CycleReport, TradeCycle};
