//! One monitoring cycle: bars in, ledger mutations out.
//!
//! Per symbol the cycle fetches bars, settles exits at the latest price,
//! assembles features, forecasts, runs the decision rules, and opens a
//! position when approved. The ledger sits behind a mutex; each symbol is
//! processed by exactly one thread at a time so position state never races.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tradebot_core::data::{FeedError, Interval, PriceFeed, SentimentSource};
use tradebot_core::decision::{
    DecisionEngine, ExchangeClient, ExchangeError, OrderRequest, TradeDecision,
};
use tradebot_core::domain::{Forecast, Position, PositionId};
use tradebot_core::features::{FeatureAssembler, RawTable};
use tradebot_core::ledger::{LedgerError, PositionLedger};
use tradebot_core::model::{Forecaster, ModelError};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("ledger mutex poisoned")]
    LedgerPoisoned,
}

/// What one cycle did for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub symbol: String,
    pub latest_price: f64,
    pub forecast: Forecast,
    pub decision: TradeDecision,
    pub closed: Vec<Position>,
    pub opened: Option<PositionId>,
}

pub struct TradeCycle {
    feed: Box<dyn PriceFeed>,
    sentiment: Box<dyn SentimentSource>,
    assembler: FeatureAssembler,
    forecaster: Forecaster,
    engine: DecisionEngine,
    exchange: Arc<dyn ExchangeClient>,
    ledger: Arc<Mutex<PositionLedger>>,
    interval: Interval,
    history_bars: usize,
}

impl TradeCycle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        feed: Box<dyn PriceFeed>,
        sentiment: Box<dyn SentimentSource>,
        assembler: FeatureAssembler,
        forecaster: Forecaster,
        engine: DecisionEngine,
        exchange: Arc<dyn ExchangeClient>,
        ledger: Arc<Mutex<PositionLedger>>,
        interval: Interval,
        history_bars: usize,
    ) -> Self {
        Self {
            feed,
            sentiment,
            assembler,
            forecaster,
            engine,
            exchange,
            ledger,
            interval,
            history_bars,
        }
    }

    pub fn ledger(&self) -> Arc<Mutex<PositionLedger>> {
        Arc::clone(&self.ledger)
    }

    /// Run one cycle for every configured symbol, in order. A symbol's
    /// failure is logged and does not stop the rest.
    pub fn run_all(&mut self) -> Vec<CycleReport> {
        let symbols = self.engine.config().symbols.clone();
        let mut reports = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.run_symbol(&symbol) {
                Ok(report) => reports.push(report),
                Err(e) => warn!(symbol = %symbol, error = %e, "cycle failed for symbol"),
            }
        }
        reports
    }

    /// Run one cycle for `symbol`.
    pub fn run_symbol(&mut self, symbol: &str) -> Result<CycleReport, CycleError> {
        let bars = self.feed.fetch(symbol, self.interval, self.history_bars)?;
        let latest_price = bars
            .last()
            .map(|b| b.close)
            .ok_or_else(|| FeedError::NoData {
                symbol: symbol.to_string(),
            })?;

        // Settle exits first so a freshly closed slot can be reopened this
        // same cycle.
        let closed = {
            let mut ledger = self.ledger.lock().map_err(|_| CycleError::LedgerPoisoned)?;
            let prices = HashMap::from([(symbol.to_string(), latest_price)]);
            ledger.evaluate_exits(&prices)?
        };

        let sentiment = self.sentiment.sentiment(symbol);
        let raw = RawTable::from_bars(&bars);
        let table = self.assembler.assemble(&raw, sentiment);
        let forecast = self.forecaster.predict(&table)?;

        let (has_open, trades_today) = {
            let mut ledger = self.ledger.lock().map_err(|_| CycleError::LedgerPoisoned)?;
            (ledger.has_open_position(symbol), ledger.trades_today())
        };
        let decision = self
            .engine
            .decide(symbol, &forecast, has_open, trades_today);

        let opened = match (&decision.action, decision.stop_loss, decision.take_profit) {
            (Some(action), Some(stop_loss), Some(take_profit)) => {
                let amount = self.engine.config().trade_amount / latest_price;
                self.exchange.place_order(&OrderRequest {
                    symbol: symbol.to_string(),
                    action: *action,
                    quantity: amount,
                    price: latest_price,
                })?;
                let mut ledger = self.ledger.lock().map_err(|_| CycleError::LedgerPoisoned)?;
                Some(ledger.open(
                    symbol,
                    *action,
                    latest_price,
                    amount,
                    stop_loss,
                    take_profit,
                )?)
            }
            _ => None,
        };

        info!(
            symbol,
            latest_price,
            change_pct = forecast.change_pct,
            confidence = forecast.confidence,
            reason = %decision.reason,
            closed = closed.len(),
            opened = opened.is_some(),
            "cycle complete"
        );
        Ok(CycleReport {
            symbol: symbol.to_string(),
            latest_price,
            forecast,
            decision,
            closed,
            opened,
        })
    }

    /// Forecast `symbol` without consulting the rules or touching the
    /// ledger.
    pub fn forecast_symbol(&mut self, symbol: &str) -> Result<Forecast, CycleError> {
        let bars = self.feed.fetch(symbol, self.interval, self.history_bars)?;
        let sentiment = self.sentiment.sentiment(symbol);
        let raw = RawTable::from_bars(&bars);
        let table = self.assembler.assemble(&raw, sentiment);
        Ok(self.forecaster.predict(&table)?)
    }

    /// Fetch fresh bars for `symbol` and retrain the model on them.
    pub fn train_symbol(&mut self, symbol: &str) -> Result<String, CycleError> {
        let bars = self.feed.fetch(symbol, self.interval, self.history_bars)?;
        let sentiment = self.sentiment.sentiment(symbol);
        let raw = RawTable::from_bars(&bars);
        let table = self.assembler.assemble(&raw, sentiment);
        Ok(self.forecaster.train(&table)?)
    }
}
