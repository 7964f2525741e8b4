//! Integration tests for batch runs and on-disk artifacts.
//!
//! Everything runs on the offline synthetic sample series.

use std::fs;
use std::path::Path;

use stratlab_core::strategy::StrategyParams;
use stratlab_runner::config::{BacktestConfig, StrategyEntry};
use stratlab_runner::export::{load_manifest, save_artifacts, save_batch_artifacts};
use stratlab_runner::{run_batch, RunError, SCHEMA_VERSION};

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn config_with_bad_entry() -> BacktestConfig {
    let mut config = BacktestConfig::default_batch();
    config.strategies.insert(
        1,
        StrategyEntry::new(
            "Broken_SMA",
            "SMAGoldenCross",
            StrategyParams {
                fast: Some(30),
                slow: Some(10),
                ..StrategyParams::default()
            },
        ),
    );
    config
}

// ── Batch isolation ──────────────────────────────────────────────────

#[test]
fn invalid_entry_does_not_stop_siblings() {
    let report = run_batch(&config_with_bad_entry()).unwrap();
    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(report.failures(), 1);
    assert_eq!(report.outcomes[1].name, "Broken_SMA");
    assert!(matches!(report.outcomes[1].result, Err(RunError::Config(_))));
    for i in [0, 2, 3] {
        assert!(report.outcomes[i].is_ok(), "run {i} should succeed");
    }
}

#[test]
fn batch_summary_lists_failures_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_batch(&config_with_bad_entry()).unwrap();
    let summary_path = save_batch_artifacts(&report, "SAMPLE", dir.path()).unwrap();

    let summary = read(&summary_path);
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[2].starts_with("Broken_SMA,SAMPLE,"));
    assert!(lines[2].contains("invalid parameter"));
    assert!(lines[1].starts_with("BuyHold_Strategy,SAMPLE,1,"));

    // No per-run artifacts for the failed run.
    assert!(!dir.path().join("trades/Broken_SMA_trades.csv").exists());
    assert!(dir.path().join("trades/BuyHold_Strategy_trades.csv").exists());
}

// ── Artifact layout ──────────────────────────────────────────────────

#[test]
fn artifacts_land_in_expected_layout() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_batch(&BacktestConfig::default_batch()).unwrap();
    let first = report.succeeded().next().unwrap();
    let paths = save_artifacts(first, dir.path()).unwrap();

    for sub in ["reports", "trades", "charts", "logs"] {
        assert!(dir.path().join(sub).is_dir(), "{sub}/ missing");
    }
    assert_eq!(paths.summary, dir.path().join("reports/BuyHold_Strategy_summary.csv"));
    assert_eq!(paths.trades, dir.path().join("trades/BuyHold_Strategy_trades.csv"));
    assert_eq!(paths.equity, dir.path().join("charts/BuyHold_Strategy_equity.csv"));
    assert_eq!(paths.event_log, dir.path().join("logs/BuyHold_Strategy_run.log"));
    assert_eq!(
        paths.manifest,
        dir.path().join("reports/BuyHold_Strategy_manifest.json")
    );

    let manifest = load_manifest(&paths.manifest).unwrap();
    assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(manifest.name, "BuyHold_Strategy");
    assert_eq!(manifest.dataset_hash, first.dataset_hash);
    assert_eq!(manifest.config_hash, first.config_hash);

    let log = read(&paths.event_log);
    assert_eq!(log.lines().count(), first.events.len());
    assert_eq!(read(&paths.equity).lines().count(), first.bar_count + 1);
}

// ── Determinism ──────────────────────────────────────────────────────

#[test]
fn repeated_batches_write_identical_files() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let config = BacktestConfig::default_batch();

    save_batch_artifacts(&run_batch(&config).unwrap(), "SAMPLE", a.path()).unwrap();
    save_batch_artifacts(&run_batch(&config).unwrap(), "SAMPLE", b.path()).unwrap();

    let mut compared = 0;
    for sub in ["reports", "trades", "charts", "logs"] {
        let mut names: Vec<_> = fs::read_dir(a.path().join(sub))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        names.sort();
        for name in names {
            let left = fs::read(a.path().join(sub).join(&name)).unwrap();
            let right = fs::read(b.path().join(sub).join(&name)).unwrap();
            assert_eq!(left, right, "{sub}/{name:?} differs between runs");
            compared += 1;
        }
    }
    // 3 runs x 5 files + batch summary
    assert_eq!(compared, 16);
}

#[test]
fn config_file_drives_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.toml");
    fs::write(
        &path,
        r#"
[backtest]
initial_cash = 10000.0
commission_rate = 0.0

[data]
source = "synthetic"
pattern = "dips"
symbol = "DIPS"
start = "2023-01-01"
end = "2023-04-30"
bars = 120

[[strategy]]
type = "BuyHold"

[[strategy]]
name = "rsi"
type = "rsi"
period = 10
"#,
    )
    .unwrap();

    let config = BacktestConfig::from_file(&path).unwrap();
    let report = run_batch(&config).unwrap();
    assert!(report.all_succeeded());
    let first = report.succeeded().next().unwrap();
    assert_eq!(first.symbol, "DIPS");
    assert_eq!(first.bar_count, 120);
    assert_eq!(first.initial_cash, 10_000.0);
    assert_eq!(report.outcomes[1].name, "rsi");
}
