//! Decision engine: forecast in, trade decision out.

use super::config::TradingConfig;
use super::rules::{RuleContext, Verdict, RULES};
use crate::domain::{Forecast, TradeAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The engine's answer to "should we trade this forecast?".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDecision {
    pub symbol: String,
    /// `None` when the proposal was rejected.
    pub action: Option<TradeAction>,
    /// Stable machine-readable code naming the rule that decided.
    pub reason: String,
    /// Human-readable explanation for logs and reports.
    pub detail: String,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub entry_price: f64,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl TradeDecision {
    pub fn is_approved(&self) -> bool {
        self.action.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: TradingConfig,
}

impl DecisionEngine {
    pub fn new(config: TradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    /// Evaluate the rule table for `symbol` against `forecast`.
    ///
    /// `has_open_position` and `trades_today` come from the ledger; the
    /// engine itself is stateless so it can be shared across symbols.
    pub fn decide(
        &self,
        symbol: &str,
        forecast: &Forecast,
        has_open_position: bool,
        trades_today: u32,
    ) -> TradeDecision {
        let ctx = RuleContext {
            config: &self.config,
            symbol,
            forecast,
            has_open_position,
            trades_today,
        };

        // The table ends with an unconditional rule, so find_map always
        // yields a verdict.
        let verdict = RULES
            .iter()
            .find_map(|rule| rule.evaluate(&ctx))
            .unwrap_or(Verdict::Reject {
                reason: "no_rule_matched",
                detail: String::new(),
            });

        let entry = forecast.current;
        match verdict {
            Verdict::Approve { action } => {
                let (stop_loss, take_profit) = self.protective_levels(action, entry);
                info!(
                    symbol,
                    ?action,
                    entry,
                    stop_loss,
                    take_profit,
                    change_pct = forecast.change_pct,
                    confidence = forecast.confidence,
                    "trade approved"
                );
                TradeDecision {
                    symbol: symbol.to_string(),
                    action: Some(action),
                    reason: "approved".into(),
                    detail: format!(
                        "{action:?} on {:.2}% forecast move at {:.2} confidence",
                        forecast.change_pct, forecast.confidence
                    ),
                    stop_loss: Some(stop_loss),
                    take_profit: Some(take_profit),
                    entry_price: entry,
                    confidence: forecast.confidence,
                    timestamp: Utc::now(),
                }
            }
            Verdict::Reject { reason, detail } => {
                debug!(symbol, reason, %detail, "trade rejected");
                TradeDecision {
                    symbol: symbol.to_string(),
                    action: None,
                    reason: reason.into(),
                    detail,
                    stop_loss: None,
                    take_profit: None,
                    entry_price: entry,
                    confidence: forecast.confidence,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    /// Stop-loss and take-profit prices around `entry`, mirrored for sells.
    fn protective_levels(&self, action: TradeAction, entry: f64) -> (f64, f64) {
        let sl = self.config.stop_loss_pct / 100.0;
        let tp = self.config.take_profit_pct / 100.0;
        match action {
            TradeAction::Buy => (entry * (1.0 - sl), entry * (1.0 + tp)),
            TradeAction::Sell => (entry * (1.0 + sl), entry * (1.0 - tp)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(TradingConfig::default())
    }

    #[test]
    fn approved_buy_sets_protective_levels() {
        let forecast = Forecast::new(100.0, 102.0, 0.9, 1);
        let decision = engine().decide("BTCUSDT", &forecast, false, 0);

        assert!(decision.is_approved());
        assert_eq!(decision.action, Some(TradeAction::Buy));
        assert_eq!(decision.reason, "approved");
        assert!((decision.stop_loss.unwrap() - 98.0).abs() < 1e-9);
        assert!((decision.take_profit.unwrap() - 103.0).abs() < 1e-9);
    }

    #[test]
    fn approved_sell_mirrors_the_levels() {
        let forecast = Forecast::new(100.0, 98.0, 0.9, 1);
        let decision = engine().decide("BTCUSDT", &forecast, false, 0);

        assert_eq!(decision.action, Some(TradeAction::Sell));
        assert!((decision.stop_loss.unwrap() - 102.0).abs() < 1e-9);
        assert!((decision.take_profit.unwrap() - 97.0).abs() < 1e-9);
    }

    #[test]
    fn rejection_carries_the_rule_code_and_no_levels() {
        let forecast = Forecast::new(100.0, 102.0, 0.9, 1);
        let decision = engine().decide("BTCUSDT", &forecast, true, 0);

        assert!(!decision.is_approved());
        assert_eq!(decision.reason, "position_already_open");
        assert!(decision.stop_loss.is_none());
        assert!(decision.take_profit.is_none());
    }

    #[test]
    fn decision_serializes_for_reporting() {
        let forecast = Forecast::new(100.0, 102.0, 0.9, 1);
        let decision = engine().decide("BTCUSDT", &forecast, false, 0);
        let json = serde_json::to_string(&decision).unwrap();
        assert!(json.contains("\"reason\":\"approved\""));
        assert!(json.contains("\"action\":\"buy\""));
    }
}
