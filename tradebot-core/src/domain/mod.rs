//! Domain types for the decision core.

pub mod bar;
pub mod forecast;
pub mod ids;
pub mod position;
pub mod stats;

pub use bar::{is_strictly_ordered, PriceBar};
pub use forecast::{Direction, Forecast, ForecastError};
pub use ids::PositionId;
pub use position::{CloseReason, Position, PositionStatus, TradeAction};
pub use stats::DailyStats;

/// Symbol type alias
pub type Symbol = String;
