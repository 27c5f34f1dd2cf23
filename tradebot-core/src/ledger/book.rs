//! The position ledger.
//!
//! Single source of truth for open and closed positions. Every mutation is
//! persisted synchronously before the call returns, so a crash between
//! cycles can lose at most in-flight work, never acknowledged state.

use super::snapshot::{LedgerError, LedgerSnapshot, SnapshotStore};
use crate::domain::{CloseReason, DailyStats, Position, PositionId, TradeAction};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Which exit wins when one price satisfies both protective levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Assume the worst fill. This is the conservative default.
    #[default]
    PreferStopLoss,
    PreferTakeProfit,
}

/// Aggregate performance over closed positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    pub open_count: usize,
    pub closed_count: usize,
    pub today_trade_count: u32,
    pub today_profit_loss_pct: f64,
    pub wins: usize,
    pub win_rate_pct: f64,
    pub avg_profit_loss_pct: f64,
    pub best_trade_pct: Option<f64>,
    pub worst_trade_pct: Option<f64>,
}

#[derive(Debug)]
pub struct PositionLedger {
    store: SnapshotStore,
    tie_break: TieBreak,
    open: Vec<Position>,
    closed: Vec<Position>,
    daily: DailyStats,
}

impl PositionLedger {
    /// Load state from `store`, starting empty when nothing (or nothing
    /// readable) is persisted.
    pub fn load(store: SnapshotStore, tie_break: TieBreak) -> Self {
        let snapshot = store.load();
        let mut daily = snapshot.daily.unwrap_or_default();
        daily.roll_over_if_stale(Utc::now().date_naive());
        Self {
            store,
            tie_break,
            open: snapshot.open_positions,
            closed: snapshot.closed_positions,
            daily,
        }
    }

    pub fn has_open_position(&self, symbol: &str) -> bool {
        self.open.iter().any(|p| p.symbol == symbol)
    }

    pub fn open_positions(&self) -> &[Position] {
        &self.open
    }

    pub fn closed_positions(&self) -> &[Position] {
        &self.closed
    }

    /// Trades opened today, rolling the counter over on a date change.
    pub fn trades_today(&mut self) -> u32 {
        self.daily.roll_over_if_stale(Utc::now().date_naive());
        self.daily.trade_count
    }

    /// Open a position and persist before returning its id.
    ///
    /// On a persistence failure the position stays in memory and the error
    /// is escalated; callers treat it as a signal to stop trading.
    pub fn open(
        &mut self,
        symbol: impl Into<String>,
        action: TradeAction,
        entry_price: f64,
        amount: f64,
        stop_loss: f64,
        take_profit: f64,
    ) -> Result<PositionId, LedgerError> {
        let position = Position::open(symbol, action, entry_price, amount, stop_loss, take_profit);
        let id = position.id.clone();
        info!(
            id = %id,
            symbol = %position.symbol,
            action = ?action,
            entry_price,
            stop_loss,
            take_profit,
            "position opened"
        );
        self.open.push(position);
        self.daily.roll_over_if_stale(Utc::now().date_naive());
        self.daily.trade_count += 1;
        self.persist()?;
        Ok(id)
    }

    /// Check every open position against `prices` and close those whose
    /// stop or take level is hit. Returns the closed positions. The
    /// snapshot is rewritten only when at least one position closed.
    pub fn evaluate_exits(
        &mut self,
        prices: &HashMap<String, f64>,
    ) -> Result<Vec<Position>, LedgerError> {
        let tie_break = self.tie_break;
        let mut closed_now = Vec::new();
        let mut still_open = Vec::with_capacity(self.open.len());

        for mut position in self.open.drain(..) {
            let Some(&price) = prices.get(&position.symbol) else {
                still_open.push(position);
                continue;
            };
            match exit_reason(&position, price, tie_break) {
                Some(reason) => {
                    position.close(price, reason);
                    info!(
                        id = %position.id,
                        symbol = %position.symbol,
                        ?reason,
                        close_price = price,
                        pnl_pct = position.profit_loss_pct,
                        "position closed"
                    );
                    closed_now.push(position);
                }
                None => still_open.push(position),
            }
        }
        self.open = still_open;

        if !closed_now.is_empty() {
            self.daily.roll_over_if_stale(Utc::now().date_naive());
            for position in &closed_now {
                self.daily.cumulative_profit_loss_pct +=
                    position.profit_loss_pct.unwrap_or(0.0);
            }
            self.closed.extend(closed_now.iter().cloned());
            self.persist()?;
        }
        Ok(closed_now)
    }

    /// Aggregate stats over the closed set. With ties, the first-closed
    /// extreme is reported.
    pub fn stats(&self) -> LedgerStats {
        let closed_count = self.closed.len();
        // Stale daily counters belong to a previous day and report as zero.
        let daily_is_current = self.daily.date == Utc::now().date_naive();
        let mut stats = LedgerStats {
            open_count: self.open.len(),
            closed_count,
            today_trade_count: if daily_is_current {
                self.daily.trade_count
            } else {
                0
            },
            today_profit_loss_pct: if daily_is_current {
                self.daily.cumulative_profit_loss_pct
            } else {
                0.0
            },
            ..Default::default()
        };
        if closed_count == 0 {
            return stats;
        }

        let mut total = 0.0;
        for position in &self.closed {
            let pnl = position.profit_loss_pct.unwrap_or(0.0);
            total += pnl;
            if pnl > 0.0 {
                stats.wins += 1;
            }
            if stats.best_trade_pct.map(|b| pnl > b).unwrap_or(true) {
                stats.best_trade_pct = Some(pnl);
            }
            if stats.worst_trade_pct.map(|w| pnl < w).unwrap_or(true) {
                stats.worst_trade_pct = Some(pnl);
            }
        }
        stats.win_rate_pct = stats.wins as f64 / closed_count as f64 * 100.0;
        stats.avg_profit_loss_pct = total / closed_count as f64;
        stats
    }

    pub fn daily(&self) -> &DailyStats {
        &self.daily
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let snapshot = LedgerSnapshot {
            open_positions: self.open.clone(),
            closed_positions: self.closed.clone(),
            daily: Some(self.daily.clone()),
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!(error = %e, "ledger snapshot write failed");
            return Err(e);
        }
        Ok(())
    }
}

/// Exit decision for one position at one price.
fn exit_reason(position: &Position, price: f64, tie_break: TieBreak) -> Option<CloseReason> {
    let (stop_hit, take_hit) = match position.action {
        TradeAction::Buy => (price <= position.stop_loss, price >= position.take_profit),
        TradeAction::Sell => (price >= position.stop_loss, price <= position.take_profit),
    };
    match (stop_hit, take_hit) {
        (true, true) => Some(match tie_break {
            TieBreak::PreferStopLoss => CloseReason::StopLoss,
            TieBreak::PreferTakeProfit => CloseReason::TakeProfit,
        }),
        (true, false) => Some(CloseReason::StopLoss),
        (false, true) => Some(CloseReason::TakeProfit),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(dir: &std::path::Path) -> PositionLedger {
        PositionLedger::load(
            SnapshotStore::new(dir.join("ledger.json")),
            TieBreak::default(),
        )
    }

    fn prices(symbol: &str, price: f64) -> HashMap<String, f64> {
        HashMap::from([(symbol.to_string(), price)])
    }

    #[test]
    fn open_persists_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();

        // a fresh load sees the position without any explicit flush
        let reloaded = ledger(dir.path());
        assert!(reloaded.has_open_position("BTCUSDT"));
        assert_eq!(reloaded.open_positions().len(), 1);
    }

    #[test]
    fn stop_loss_exit_realizes_directional_pnl() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();

        let closed = book.evaluate_exits(&prices("BTCUSDT", 97.0)).unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].close_reason, Some(CloseReason::StopLoss));
        assert!((closed[0].profit_loss_pct.unwrap() + 3.0).abs() < 1e-9);
        assert!(!book.has_open_position("BTCUSDT"));
    }

    #[test]
    fn sell_take_profit_triggers_below_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        book.open("ETHUSDT", TradeAction::Sell, 100.0, 50.0, 102.0, 97.0)
            .unwrap();

        let closed = book.evaluate_exits(&prices("ETHUSDT", 96.0)).unwrap();
        assert_eq!(closed[0].close_reason, Some(CloseReason::TakeProfit));
        assert!(closed[0].profit_loss_pct.unwrap() > 0.0);
    }

    #[test]
    fn unhit_levels_leave_the_position_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();

        let closed = book.evaluate_exits(&prices("BTCUSDT", 100.5)).unwrap();
        assert!(closed.is_empty());
        assert!(book.has_open_position("BTCUSDT"));
    }

    #[test]
    fn tie_break_prefers_stop_loss_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        // inverted levels so one price satisfies both
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 101.0, 99.0)
            .unwrap();

        let closed = book.evaluate_exits(&prices("BTCUSDT", 100.0)).unwrap();
        assert_eq!(closed[0].close_reason, Some(CloseReason::StopLoss));
    }

    #[test]
    fn tie_break_can_prefer_take_profit() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = PositionLedger::load(
            SnapshotStore::new(dir.path().join("ledger.json")),
            TieBreak::PreferTakeProfit,
        );
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 101.0, 99.0)
            .unwrap();

        let closed = book.evaluate_exits(&prices("BTCUSDT", 100.0)).unwrap();
        assert_eq!(closed[0].close_reason, Some(CloseReason::TakeProfit));
    }

    #[test]
    fn daily_counter_tracks_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        assert_eq!(book.trades_today(), 0);
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();
        book.open("ETHUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();
        assert_eq!(book.trades_today(), 2);
    }

    #[test]
    fn stats_reflect_closed_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();
        book.open("ETHUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();
        book.evaluate_exits(&prices("BTCUSDT", 103.0)).unwrap();
        book.evaluate_exits(&prices("ETHUSDT", 97.0)).unwrap();

        let stats = book.stats();
        assert_eq!(stats.closed_count, 2);
        assert_eq!(stats.today_trade_count, 2);
        assert!(stats.today_profit_loss_pct.abs() < 1e-9);
        assert_eq!(stats.wins, 1);
        assert!((stats.win_rate_pct - 50.0).abs() < 1e-9);
        assert!(stats.avg_profit_loss_pct.abs() < 1e-9);
        assert!((stats.best_trade_pct.unwrap() - 3.0).abs() < 1e-9);
        assert!((stats.worst_trade_pct.unwrap() + 3.0).abs() < 1e-9);
    }

    #[test]
    fn reload_reproduces_stats() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut book = ledger(dir.path());
            book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
                .unwrap();
            book.evaluate_exits(&prices("BTCUSDT", 103.0)).unwrap();
        }
        let reloaded = ledger(dir.path());
        let stats = reloaded.stats();
        assert_eq!(stats.closed_count, 1);
        assert_eq!(stats.wins, 1);
        assert!((stats.best_trade_pct.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn missing_price_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = ledger(dir.path());
        book.open("BTCUSDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0)
            .unwrap();
        let closed = book.evaluate_exits(&prices("ETHUSDT", 1.0)).unwrap();
        assert!(closed.is_empty());
        assert!(book.has_open_position("BTCUSDT"));
    }
}
