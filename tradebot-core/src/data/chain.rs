//! Feed fallback chain.

use super::provider::{FeedError, Interval, PriceFeed};
use crate::domain::PriceBar;
use tracing::warn;

/// Tries each feed in order and returns the first success.
///
/// Built so the last link can be the synthetic feed, which never fails, so a
/// monitoring cycle always has bars to work with even fully offline.
pub struct FeedChain {
    feeds: Vec<Box<dyn PriceFeed>>,
}

impl FeedChain {
    pub fn new(feeds: Vec<Box<dyn PriceFeed>>) -> Self {
        Self { feeds }
    }

    pub fn push(&mut self, feed: Box<dyn PriceFeed>) {
        self.feeds.push(feed);
    }
}

impl PriceFeed for FeedChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<PriceBar>, FeedError> {
        for feed in &self.feeds {
            match feed.fetch(symbol, interval, limit) {
                Ok(bars) => return Ok(bars),
                Err(e) => {
                    warn!(feed = feed.name(), symbol, error = %e, "feed failed, trying next");
                }
            }
        }
        Err(FeedError::Exhausted {
            symbol: symbol.to_string(),
        })
    }
}
