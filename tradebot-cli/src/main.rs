//! TradeBot CLI — run the monitoring loop, train models, inspect the ledger.
//!
//! Commands:
//! - `run` — start the scheduled monitoring loop
//! - `cycle` — execute a single monitoring cycle and print the reports
//! - `train` — retrain the forecast model on fresh data
//! - `forecast` — print forecasts without touching the ledger
//! - `stats` — print ledger performance statistics

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradebot_core::domain::ForecastError;
use tradebot_core::ledger::{PositionLedger, SnapshotStore};
use tradebot_runner::{build_cycle, scheduler, AppConfig};

#[derive(Parser)]
#[command(name = "tradebot", about = "TradeBot — automated market monitoring and paper trading")]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the exchange feed; run on CSV/synthetic data only.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Use only the synthetic data generator, ignoring exchange and CSV
    /// feeds.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scheduled monitoring loop and run until killed.
    Run,
    /// Execute a single monitoring cycle and print the reports as JSON.
    Cycle {
        /// Limit the cycle to one symbol. Defaults to all configured symbols.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Retrain the forecast model on fresh data.
    Train {
        /// Symbol to train on. Defaults to the first configured symbol.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Print forecasts for the configured symbols without trading.
    Forecast {
        /// Limit the forecast to one symbol.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Print ledger performance statistics as JSON.
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if cli.offline {
        config.data.offline = true;
    }
    if cli.synthetic {
        config.data.synthetic = true;
    }

    match cli.command {
        Commands::Run => run_loop(config),
        Commands::Cycle { symbol } => run_cycle_once(config, symbol),
        Commands::Train { symbol } => run_train(config, symbol),
        Commands::Forecast { symbol } => run_forecast(config, symbol),
        Commands::Stats => run_stats(&config),
    }
}

fn run_loop(config: AppConfig) -> Result<()> {
    let every = scheduler::parse_every(&config.schedule.every)?;
    let mut cycle = build_cycle(&config)?;
    info!(
        every = %config.schedule.every,
        symbols = ?config.trading.symbols,
        paper = config.trading.paper_trading,
        "starting monitoring loop"
    );

    let mut scheduler = scheduler::Scheduler::new();
    scheduler.add("monitor", every, move || {
        cycle.run_all();
        Ok(())
    });
    scheduler.start();

    // The scheduler owns the work from here; park until the process is
    // killed.
    loop {
        std::thread::park();
    }
}

fn run_cycle_once(config: AppConfig, symbol: Option<String>) -> Result<()> {
    let mut cycle = build_cycle(&config)?;
    let reports = match symbol {
        Some(symbol) => vec![cycle.run_symbol(&symbol)?],
        None => cycle.run_all(),
    };
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn run_train(config: AppConfig, symbol: Option<String>) -> Result<()> {
    let symbol = match symbol {
        Some(s) => s,
        None => config
            .trading
            .symbols
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no symbols configured"))?,
    };
    let mut cycle = build_cycle(&config)?;
    let stem = cycle.train_symbol(&symbol)?;
    info!(symbol, stem, "training complete");
    println!("{stem}");
    Ok(())
}

fn run_forecast(config: AppConfig, symbol: Option<String>) -> Result<()> {
    let mut cycle = build_cycle(&config)?;
    let symbols = match symbol {
        Some(symbol) => vec![symbol],
        None => config.trading.symbols.clone(),
    };
    // Per-symbol failures become structured error payloads instead of
    // aborting the other symbols.
    let mut output = serde_json::Map::new();
    for symbol in symbols {
        let value = match cycle.forecast_symbol(&symbol) {
            Ok(forecast) => serde_json::to_value(forecast)?,
            Err(e) => serde_json::to_value(ForecastError::new(e.to_string()))?,
        };
        output.insert(symbol, value);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_stats(config: &AppConfig) -> Result<()> {
    let ledger = PositionLedger::load(
        SnapshotStore::new(&config.ledger.path),
        config.ledger.tie_break,
    );
    println!("{}", serde_json::to_string_pretty(&ledger.stats())?);
    Ok(())
}
