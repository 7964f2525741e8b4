//! Artifact export — JSON manifest, CSV tables, and JSON-lines event logs.
//!
//! Layout under the output directory:
//! - `reports/{name}_summary.csv`, `reports/{name}_manifest.json`
//! - `trades/{name}_trades.csv`
//! - `charts/{name}_equity.csv`
//! - `logs/{name}_run.log`
//!
//! Paths carry no wall-clock timestamp and every writer formats numbers with
//! fixed precision, so the same run always produces byte-identical files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stratlab_core::domain::Trade;
use stratlab_core::engine::{EquityPoint, RunEvent};

use crate::batch::BatchReport;
use crate::metrics::PerformanceReport;
use crate::runner::{BacktestReport, SCHEMA_VERSION};

/// Subdirectories created under the output directory.
pub const ARTIFACT_DIRS: [&str; 4] = ["reports", "trades", "charts", "logs"];

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a `BacktestReport`, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// One JSON object per line, in emission order.
pub fn export_event_log(events: &[RunEvent]) -> Result<String> {
    let mut out = String::new();
    for event in events {
        let line = serde_json::to_string(event).context("failed to serialize run event")?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

// ─── CSV export ─────────────────────────────────────────────────────

const SUMMARY_HEADER: [&str; 19] = [
    "strategy",
    "symbol",
    "total_trades",
    "won",
    "lost",
    "long",
    "short",
    "win_rate_pct",
    "gross_profit",
    "gross_loss",
    "net_profit",
    "total_return_pct",
    "annualized_return_pct",
    "sharpe",
    "max_drawdown_pct",
    "sqn",
    "final_equity",
    "rejected_orders",
    "error",
];

fn opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

fn summary_record(name: &str, symbol: &str, p: &PerformanceReport) -> Vec<String> {
    vec![
        name.to_string(),
        symbol.to_string(),
        p.total_trades.to_string(),
        p.won_trades.to_string(),
        p.lost_trades.to_string(),
        p.long_trades.to_string(),
        p.short_trades.to_string(),
        format!("{:.2}", p.win_rate_pct),
        format!("{:.2}", p.gross_profit),
        format!("{:.2}", p.gross_loss),
        format!("{:.2}", p.net_profit),
        format!("{:.4}", p.total_return_pct),
        opt(p.annualized_return_pct, 4),
        opt(p.sharpe, 4),
        format!("{:.4}", p.max_drawdown_pct),
        opt(p.sqn, 4),
        format!("{:.2}", p.final_equity),
        p.rejected_orders.to_string(),
        String::new(),
    ]
}

fn failure_record(name: &str, symbol: &str, error: &str) -> Vec<String> {
    let mut record = vec![String::new(); SUMMARY_HEADER.len()];
    record[0] = name.to_string();
    record[1] = symbol.to_string();
    record[SUMMARY_HEADER.len() - 1] = error.to_string();
    record
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Single-row summary for one run.
pub fn export_summary_csv(report: &BacktestReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SUMMARY_HEADER)?;
    wtr.write_record(summary_record(
        &report.name,
        &report.symbol,
        &report.performance,
    ))?;
    finish(wtr)
}

/// One row per run in config order. Failed runs leave the metric columns
/// empty and fill `error`.
pub fn export_batch_summary_csv(batch: &BatchReport, symbol: &str) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SUMMARY_HEADER)?;
    for outcome in &batch.outcomes {
        let record = match &outcome.result {
            Ok(report) => summary_record(&outcome.name, &report.symbol, &report.performance),
            Err(e) => failure_record(&outcome.name, symbol, &e.to_string()),
        };
        wtr.write_record(record)?;
    }
    finish(wtr)
}

/// Trade log with every trade field.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ref_id",
        "symbol",
        "side",
        "open_bar",
        "open_timestamp",
        "open_price",
        "close_bar",
        "close_timestamp",
        "close_price",
        "size",
        "value",
        "gross_pnl",
        "entry_commission",
        "exit_commission",
        "commission",
        "net_pnl",
        "pnl_pct",
        "bars_held",
        "forced_close",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.ref_id.to_string(),
            &t.symbol,
            &format!("{:?}", t.side),
            &t.open_bar.to_string(),
            &t.open_timestamp.to_string(),
            &format!("{:.6}", t.open_price),
            &t.close_bar.to_string(),
            &t.close_timestamp.to_string(),
            &format!("{:.6}", t.close_price),
            &format!("{:.6}", t.size),
            &format!("{:.2}", t.value),
            &format!("{:.2}", t.gross_pnl),
            &format!("{:.2}", t.entry_commission),
            &format!("{:.2}", t.exit_commission),
            &format!("{:.2}", t.commission),
            &format!("{:.2}", t.net_pnl),
            &format!("{:.4}", t.pnl_pct),
            &t.bars_held.to_string(),
            &t.forced_close.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Equity at each bar close.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity"])?;
    for point in equity_curve {
        wtr.write_record([&point.timestamp.to_string(), &format!("{:.2}", point.equity)])?;
    }
    finish(wtr)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Files written for one run.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub summary: PathBuf,
    pub trades: PathBuf,
    pub equity: PathBuf,
    pub event_log: PathBuf,
    pub manifest: PathBuf,
}

/// Stem of the batch table, `reports/batch_summary.csv`. No run may use it.
pub const BATCH_STEM: &str = "batch";

/// File-name-safe form of a run name.
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn create_layout(output_dir: &Path) -> Result<()> {
    for dir in ARTIFACT_DIRS {
        let path = output_dir.join(dir);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create artifact dir: {}", path.display()))?;
    }
    Ok(())
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Save the full artifact set for a single run. Existing files are overwritten.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<ArtifactPaths> {
    create_layout(output_dir)?;
    let stem = file_stem(&report.name);
    let paths = ArtifactPaths {
        summary: output_dir.join("reports").join(format!("{stem}_summary.csv")),
        trades: output_dir.join("trades").join(format!("{stem}_trades.csv")),
        equity: output_dir.join("charts").join(format!("{stem}_equity.csv")),
        event_log: output_dir.join("logs").join(format!("{stem}_run.log")),
        manifest: output_dir.join("reports").join(format!("{stem}_manifest.json")),
    };

    write(&paths.summary, &export_summary_csv(report)?)?;
    write(&paths.trades, &export_trades_csv(&report.trades)?)?;
    write(&paths.equity, &export_equity_csv(&report.equity_curve)?)?;
    write(&paths.event_log, &export_event_log(&report.events)?)?;
    write(&paths.manifest, &export_json(report)?)?;

    Ok(paths)
}

/// Save artifacts for every successful run plus `reports/batch_summary.csv`.
///
/// Returns the batch summary path.
pub fn save_batch_artifacts(
    batch: &BatchReport,
    symbol: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    create_layout(output_dir)?;
    for report in batch.succeeded() {
        save_artifacts(report, output_dir)
            .with_context(|| format!("failed to save artifacts for {}", report.name))?;
    }
    let path = output_dir
        .join("reports")
        .join(format!("{BATCH_STEM}_summary.csv"));
    write(&path, &export_batch_summary_csv(batch, symbol)?)?;
    Ok(path)
}

/// Load a report from its manifest, rejecting newer schema versions.
pub fn load_manifest(path: &Path) -> Result<BacktestReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
