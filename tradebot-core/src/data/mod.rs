//! Market data sources: exchange klines, CSV files, a synthetic fallback,
//! and the chain that stitches them together.

mod binance;
mod chain;
mod csv_feed;
mod provider;
mod sentiment;
mod synthetic;

pub use binance::BinanceFeed;
pub use chain::FeedChain;
pub use csv_feed::CsvFeed;
pub use provider::{FeedError, Interval, PriceFeed};
pub use sentiment::{RandomSentiment, SentimentSource};
pub use synthetic::SyntheticFeed;
