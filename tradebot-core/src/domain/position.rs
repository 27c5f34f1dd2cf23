//! Position — one open or closed trade tracked by the ledger.

use super::ids::PositionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// A tracked position.
///
/// Created by decision-engine approval, owned exclusively by the ledger, and
/// mutated only by exit evaluation. Closed positions are never destroyed —
/// they move to the append-only history set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub action: TradeAction,
    pub entry_price: f64,
    pub amount: f64,
    pub opened_at: DateTime<Utc>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub status: PositionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<CloseReason>,
}

impl Position {
    pub fn open(
        symbol: impl Into<String>,
        action: TradeAction,
        entry_price: f64,
        amount: f64,
        stop_loss: f64,
        take_profit: f64,
    ) -> Self {
        debug_assert!(entry_price > 0.0 && amount > 0.0);
        Self {
            id: PositionId::generate(),
            symbol: symbol.into(),
            action,
            entry_price,
            amount,
            opened_at: Utc::now(),
            stop_loss,
            take_profit,
            status: PositionStatus::Open,
            close_price: None,
            closed_at: None,
            profit_loss_pct: None,
            close_reason: None,
        }
    }

    /// Directional unrealized P/L in percent at `current_price`.
    ///
    /// Buy: (current − entry) / entry × 100. Sell: mirrored.
    pub fn unrealized_pnl_pct(&self, current_price: f64) -> f64 {
        match self.action {
            TradeAction::Buy => (current_price - self.entry_price) / self.entry_price * 100.0,
            TradeAction::Sell => (self.entry_price - current_price) / self.entry_price * 100.0,
        }
    }

    /// Mark this position closed at `close_price` for `reason`.
    pub(crate) fn close(&mut self, close_price: f64, reason: CloseReason) {
        self.status = PositionStatus::Closed;
        self.close_price = Some(close_price);
        self.closed_at = Some(Utc::now());
        self.profit_loss_pct = Some(self.unrealized_pnl_pct(close_price));
        self.close_reason = Some(reason);
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_pnl_is_directional() {
        let pos = Position::open("BTC-USDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0);
        assert!((pos.unrealized_pnl_pct(103.0) - 3.0).abs() < 1e-12);
        assert!((pos.unrealized_pnl_pct(97.0) + 3.0).abs() < 1e-12);
    }

    #[test]
    fn sell_pnl_is_mirrored() {
        let pos = Position::open("BTC-USDT", TradeAction::Sell, 100.0, 50.0, 102.0, 97.0);
        assert!((pos.unrealized_pnl_pct(97.0) - 3.0).abs() < 1e-12);
        assert!((pos.unrealized_pnl_pct(102.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn close_fills_exit_fields() {
        let mut pos = Position::open("ETH-USDT", TradeAction::Buy, 100.0, 50.0, 98.0, 103.0);
        pos.close(97.0, CloseReason::StopLoss);
        assert_eq!(pos.status, PositionStatus::Closed);
        assert_eq!(pos.close_price, Some(97.0));
        assert_eq!(pos.close_reason, Some(CloseReason::StopLoss));
        assert!((pos.profit_loss_pct.unwrap() + 3.0).abs() < 1e-12);
        assert!(pos.closed_at.is_some());
    }

    #[test]
    fn close_reason_serializes_snake_case() {
        let json = serde_json::to_string(&CloseReason::StopLoss).unwrap();
        assert_eq!(json, "\"stop_loss\"");
    }
}
