//! Ordered decision rules.
//!
//! The engine walks the table top to bottom and takes the first rule whose
//! predicate fires. Guard rules reject; the final rule always matches and
//! approves. Rule order is load-bearing: cheap account-level guards run
//! before forecast-quality guards.

use super::config::TradingConfig;
use crate::domain::{Direction, Forecast, TradeAction};

/// What the decision engine knows when it evaluates a proposal.
#[derive(Debug)]
pub struct RuleContext<'a> {
    pub config: &'a TradingConfig,
    pub symbol: &'a str,
    pub forecast: &'a Forecast,
    /// An open position already exists for this symbol.
    pub has_open_position: bool,
    /// Trades opened so far today, across all symbols.
    pub trades_today: u32,
}

/// Outcome of a single rule. `None` means the rule does not apply and the
/// next one is consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Reject { reason: &'static str, detail: String },
    Approve { action: TradeAction },
}

pub struct Rule {
    pub name: &'static str,
    check: fn(&RuleContext) -> Option<Verdict>,
}

impl Rule {
    pub fn evaluate(&self, ctx: &RuleContext) -> Option<Verdict> {
        (self.check)(ctx)
    }
}

/// The rule table, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "trading_disabled",
        check: |ctx| {
            (!ctx.config.enabled).then(|| Verdict::Reject {
                reason: "trading_disabled",
                detail: "trading is disabled in configuration".into(),
            })
        },
    },
    Rule {
        name: "symbol_not_tracked",
        check: |ctx| {
            (!ctx.config.tracks(ctx.symbol)).then(|| Verdict::Reject {
                reason: "symbol_not_tracked",
                detail: format!("{} is not in the tracked symbol list", ctx.symbol),
            })
        },
    },
    Rule {
        name: "daily_limit_reached",
        check: |ctx| {
            (ctx.trades_today >= ctx.config.max_trades_per_day).then(|| Verdict::Reject {
                reason: "daily_limit_reached",
                detail: format!(
                    "{} trades today, limit is {}",
                    ctx.trades_today, ctx.config.max_trades_per_day
                ),
            })
        },
    },
    Rule {
        name: "position_already_open",
        check: |ctx| {
            ctx.has_open_position.then(|| Verdict::Reject {
                reason: "position_already_open",
                detail: format!("an open position already exists for {}", ctx.symbol),
            })
        },
    },
    Rule {
        name: "confidence_below_threshold",
        check: |ctx| {
            (ctx.forecast.confidence < ctx.config.confidence_threshold).then(|| Verdict::Reject {
                reason: "confidence_below_threshold",
                detail: format!(
                    "confidence {:.2} below threshold {:.2}",
                    ctx.forecast.confidence, ctx.config.confidence_threshold
                ),
            })
        },
    },
    Rule {
        name: "change_below_minimum",
        check: |ctx| {
            (ctx.forecast.change_pct.abs() < ctx.config.min_change_pct).then(|| Verdict::Reject {
                reason: "change_below_minimum",
                detail: format!(
                    "forecast move {:.2}% below minimum {:.2}%",
                    ctx.forecast.change_pct, ctx.config.min_change_pct
                ),
            })
        },
    },
    Rule {
        name: "approved",
        check: |ctx| {
            Some(Verdict::Approve {
                action: match ctx.forecast.direction {
                    Direction::Up => TradeAction::Buy,
                    Direction::Down => TradeAction::Sell,
                },
            })
        },
    },
];
