//! Daily trading counters with lazy date rollover.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-day trade counter and cumulative P/L.
///
/// The rollover is lazy: whenever the stats are consulted on a new wall-clock
/// date they reset to zero. There is no background timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub trade_count: u32,
    pub cumulative_profit_loss_pct: f64,
}

impl DailyStats {
    pub fn today() -> Self {
        Self::for_date(Utc::now().date_naive())
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            trade_count: 0,
            cumulative_profit_loss_pct: 0.0,
        }
    }

    /// Reset counters if the stored date is not `today`.
    pub fn roll_over_if_stale(&mut self, today: NaiveDate) {
        if self.date != today {
            *self = Self::for_date(today);
        }
    }
}

impl Default for DailyStats {
    fn default() -> Self {
        Self::today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_date_resets_counters() {
        let old = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let mut stats = DailyStats::for_date(old);
        stats.trade_count = 4;
        stats.cumulative_profit_loss_pct = 2.5;

        stats.roll_over_if_stale(today);
        assert_eq!(stats.date, today);
        assert_eq!(stats.trade_count, 0);
        assert_eq!(stats.cumulative_profit_loss_pct, 0.0);
    }

    #[test]
    fn same_date_is_untouched() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut stats = DailyStats::for_date(date);
        stats.trade_count = 2;
        stats.roll_over_if_stale(date);
        assert_eq!(stats.trade_count, 2);
    }
}
