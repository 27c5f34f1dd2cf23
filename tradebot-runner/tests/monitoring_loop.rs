//! Full-stack monitoring tests on offline configuration.

use tradebot_core::ledger::{PositionLedger, SnapshotStore};
use tradebot_runner::{build_cycle, AppConfig};

fn offline_config(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.offline = true;
    config.ledger.path = dir.join("ledger.json");
    config.model.artifact_dir = dir.join("models");
    config.model.config.kind = tradebot_core::model::ModelKind::Linear;
    config
}

#[test]
fn offline_cycle_reports_every_configured_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());
    let mut cycle = build_cycle(&config).unwrap();

    let reports = cycle.run_all();
    assert_eq!(reports.len(), config.trading.symbols.len());
    for report in &reports {
        assert!(report.latest_price > 0.0);
        assert!(report.forecast.prediction.is_finite());
    }
}

#[test]
fn train_then_cycle_uses_persisted_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path());

    {
        let mut cycle = build_cycle(&config).unwrap();
        let stem = cycle.train_symbol("BTCUSDT").unwrap();
        assert!(dir
            .path()
            .join("models")
            .join(format!("{stem}.model.json"))
            .exists());
    }

    // A fresh cycle picks the saved model up from disk.
    let mut cycle = build_cycle(&config).unwrap();
    let reports = cycle.run_all();
    assert!(!reports.is_empty());
}

#[test]
fn ledger_state_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path());
    // permissive policy so the synthetic forecast opens positions
    config.trading.confidence_threshold = 0.0;
    config.trading.min_change_pct = 0.0;

    let open_count = {
        let mut cycle = build_cycle(&config).unwrap();
        cycle.run_all();
        let ledger = cycle.ledger();
        let guard = ledger.lock().unwrap();
        guard.open_positions().len() + guard.closed_positions().len()
    };
    assert!(open_count > 0);

    let reloaded = PositionLedger::load(
        SnapshotStore::new(&config.ledger.path),
        config.ledger.tie_break,
    );
    assert_eq!(
        reloaded.open_positions().len() + reloaded.closed_positions().len(),
        open_count
    );
}

#[test]
fn disabled_trading_leaves_the_ledger_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = offline_config(dir.path());
    config.trading.enabled = false;

    let mut cycle = build_cycle(&config).unwrap();
    cycle.run_all();

    let ledger = cycle.ledger();
    let guard = ledger.lock().unwrap();
    assert!(guard.open_positions().is_empty());
    assert!(guard.closed_positions().is_empty());
}
