//! Forecast — the model's near-term price estimate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of the forecast relative to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// A single price forecast.
///
/// Invariant: `direction == Up` iff `prediction > current`, and
/// `change`/`change_pct` are derived from the same pair. Construct through
/// [`Forecast::new`] to keep the derived fields consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub current: f64,
    pub prediction: f64,
    pub change: f64,
    pub change_pct: f64,
    pub direction: Direction,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    /// Number of future sampling steps this forecast targets.
    pub horizon: usize,
}

impl Forecast {
    pub fn new(current: f64, prediction: f64, confidence: f64, horizon: usize) -> Self {
        let change = prediction - current;
        Self {
            current,
            prediction,
            change,
            change_pct: change / current * 100.0,
            direction: if prediction > current {
                Direction::Up
            } else {
                Direction::Down
            },
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
            horizon: horizon.max(1),
        }
    }
}

/// Structured error payload returned to callers instead of a panic or a bare
/// error string when prediction fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastError {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl ForecastError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_follows_prediction() {
        let up = Forecast::new(100.0, 102.0, 0.9, 1);
        assert_eq!(up.direction, Direction::Up);
        assert!((up.change_pct - 2.0).abs() < 1e-12);

        let down = Forecast::new(100.0, 99.0, 0.9, 1);
        assert_eq!(down.direction, Direction::Down);
        assert!((down.change - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn equal_prices_are_down() {
        // direction = up iff prediction > current; equality is not "up"
        let flat = Forecast::new(100.0, 100.0, 0.5, 1);
        assert_eq!(flat.direction, Direction::Down);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Forecast::new(1.0, 2.0, 1.7, 1).confidence, 1.0);
        assert_eq!(Forecast::new(1.0, 2.0, -0.2, 1).confidence, 0.0);
    }

    #[test]
    fn horizon_floor_is_one() {
        assert_eq!(Forecast::new(1.0, 2.0, 0.5, 0).horizon, 1);
    }
}
