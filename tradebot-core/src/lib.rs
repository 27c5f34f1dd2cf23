//! TradeBot Core — the market-monitoring decision loop.
//!
//! This crate contains everything between raw price bars and a persisted
//! position:
//! - Domain types (bars, forecasts, positions, daily stats)
//! - Technical indicators (RSI, EMA, MACD, rolling volatility)
//! - Feature assembly with a total-by-construction output table
//! - Forecast models (random forest, boosted stumps, linear) with on-disk
//!   artifacts
//! - The ordered-rule decision engine and paper execution seam
//! - The position ledger with synchronous crash-safe persistence
//! - Price and sentiment feeds, including the always-available synthetic
//!   fallback

pub mod data;
pub mod decision;
pub mod domain;
pub mod features;
pub mod indicators;
pub mod ledger;
pub mod model;
