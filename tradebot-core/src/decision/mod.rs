//! Trade decision making: policy config, the ordered rule table, the engine
//! that runs it, and the execution seam.

mod config;
mod engine;
mod exchange;
mod rules;

pub use config::TradingConfig;
pub use engine::{DecisionEngine, TradeDecision};
pub use exchange::{
    ExchangeClient, ExchangeError, LiveExchange, OrderReceipt, OrderRequest, PaperExchange,
};
pub use rules::{Rule, RuleContext, Verdict, RULES};
