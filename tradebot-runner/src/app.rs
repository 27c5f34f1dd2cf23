//! Wiring: build a ready-to-run [`TradeCycle`] from an [`AppConfig`].

use crate::config::AppConfig;
use crate::cycle::TradeCycle;
use anyhow::Context;
use std::sync::{Arc, Mutex};
use tradebot_core::data::{
    BinanceFeed, CsvFeed, FeedChain, Interval, PriceFeed, RandomSentiment, SyntheticFeed,
};
use tradebot_core::decision::{DecisionEngine, ExchangeClient, LiveExchange, PaperExchange};
use tradebot_core::features::FeatureAssembler;
use tradebot_core::ledger::{PositionLedger, SnapshotStore};
use tradebot_core::model::{Forecaster, ModelStore};
use tracing::info;

/// Build the feed chain: exchange first (unless offline), then CSV if
/// configured, then the synthetic fallback that never fails. In synthetic
/// mode the chain is the generator alone.
fn build_feed(config: &AppConfig) -> anyhow::Result<Box<dyn PriceFeed>> {
    let mut feeds: Vec<Box<dyn PriceFeed>> = Vec::new();
    if !config.data.synthetic {
        if !config.data.offline {
            feeds.push(Box::new(
                BinanceFeed::new().context("building exchange client")?,
            ));
        }
        if let Some(dir) = &config.data.csv_dir {
            feeds.push(Box::new(CsvFeed::new(dir)));
        }
    }
    feeds.push(Box::new(SyntheticFeed::new(config.data.seed)));
    Ok(Box::new(FeedChain::new(feeds)))
}

/// Paper mode gets the simulator; live mode gets the credential-less live
/// client that refuses orders, never a silent simulation.
fn build_exchange(config: &AppConfig) -> Arc<dyn ExchangeClient> {
    if config.trading.paper_trading {
        Arc::new(PaperExchange::new())
    } else {
        info!("paper trading disabled; orders will be refused until API credentials exist");
        Arc::new(LiveExchange::new())
    }
}

/// Assemble the full cycle from configuration.
pub fn build_cycle(config: &AppConfig) -> anyhow::Result<TradeCycle> {
    let interval: Interval = config
        .data
        .interval
        .parse()
        .map_err(|e: String| anyhow::anyhow!("bad data interval: {e}"))?;

    let ledger = PositionLedger::load(
        SnapshotStore::new(&config.ledger.path),
        config.ledger.tie_break,
    );
    info!(
        open = ledger.open_positions().len(),
        closed = ledger.closed_positions().len(),
        path = %config.ledger.path.display(),
        "ledger loaded"
    );

    let forecaster = Forecaster::new(
        config.model.config.clone(),
        ModelStore::new(&config.model.artifact_dir),
    );

    Ok(TradeCycle::new(
        build_feed(config)?,
        Box::new(RandomSentiment::new(config.data.seed)),
        FeatureAssembler::default(),
        forecaster,
        DecisionEngine::new(config.trading.clone()),
        build_exchange(config),
        Arc::new(Mutex::new(ledger)),
        interval,
        config.data.history_bars,
    ))
}
