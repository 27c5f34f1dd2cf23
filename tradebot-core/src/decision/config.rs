//! Trading policy configuration.

use serde::{Deserialize, Serialize};

/// Policy knobs consulted by the decision rules.
///
/// `paper_trading` is an explicit flag rather than an absence of credentials
/// so that flipping to live execution is always a deliberate config change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Master switch; when false every proposal is rejected.
    pub enabled: bool,
    /// Simulated fills when true. When false the live client is installed,
    /// which refuses every order until API credentials are configured.
    pub paper_trading: bool,
    /// Symbols the bot is allowed to trade.
    pub symbols: Vec<String>,
    pub max_trades_per_day: u32,
    /// Notional size per trade, in quote currency.
    pub trade_amount: f64,
    /// Minimum model confidence, in [0, 1].
    pub confidence_threshold: f64,
    /// Minimum absolute forecast move, in percent.
    pub min_change_pct: f64,
    /// Stop distance from entry, in percent.
    pub stop_loss_pct: f64,
    /// Take-profit distance from entry, in percent.
    pub take_profit_pct: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            paper_trading: true,
            symbols: vec!["BTCUSDT".into(), "ETHUSDT".into()],
            max_trades_per_day: 5,
            trade_amount: 100.0,
            confidence_threshold: 0.7,
            min_change_pct: 1.0,
            stop_loss_pct: 2.0,
            take_profit_pct: 3.0,
        }
    }
}

impl TradingConfig {
    pub fn tracks(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_paper_and_enabled() {
        let config = TradingConfig::default();
        assert!(config.enabled);
        assert!(config.paper_trading);
        assert_eq!(config.max_trades_per_day, 5);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: TradingConfig = toml::from_str("confidence_threshold = 0.9").unwrap();
        assert_eq!(config.confidence_threshold, 0.9);
        assert_eq!(config.min_change_pct, 1.0);
        assert!(config.tracks("BTCUSDT"));
        assert!(!config.tracks("DOGEUSDT"));
    }
}
