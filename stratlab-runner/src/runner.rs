//! Backtest runner — wires together data, strategy, simulator, and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: takes a pre-loaded series. Used by batch mode and the CLI.
//! - `load_series()`: builds the configured provider and fetches the series once
//!   per batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span, warn};

use stratlab_core::data::{
    CsvProvider, DataError, DataProvider, DataSource, SyntheticProvider, YahooProvider,
};
use stratlab_core::domain::{PriceSeries, Trade};
use stratlab_core::engine::{run_simulation, EngineConfig, EquityPoint, Rejection, RunEvent};
use stratlab_core::strategy::{ConfigError, StrategySpec};

use crate::config::DataSection;
use crate::metrics::PerformanceReport;

/// Errors from a single run. Batch mode reports these per run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("run exceeded {secs}s time limit")]
    Timeout { secs: u64 },
    #[error("run panicked: {0}")]
    Panicked(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Label used for artifact file names.
    pub name: String,
    pub spec: StrategySpec,
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub initial_cash: f64,
    pub commission_rate: f64,
    pub bar_count: usize,
    /// blake3 of the series content.
    pub dataset_hash: String,
    /// blake3 of the strategy spec and engine config.
    pub config_hash: String,
    pub performance: PerformanceReport,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub events: Vec<RunEvent>,
    pub rejections: Vec<Rejection>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Stable hash of everything that parameterizes a run besides the data.
pub fn config_hash(spec: &StrategySpec, config: &EngineConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    // Both serialize infallibly: plain structs of numbers and strings.
    let spec_json = serde_json::to_vec(spec).unwrap_or_default();
    let config_json = serde_json::to_vec(config).unwrap_or_default();
    hasher.update(&spec_json);
    hasher.update(b"\0");
    hasher.update(&config_json);
    hasher.finalize().to_hex().to_string()
}

/// Run one strategy over a pre-loaded series — no I/O.
pub fn run_backtest(
    name: &str,
    spec: &StrategySpec,
    series: &PriceSeries,
    config: &EngineConfig,
) -> Result<BacktestReport, RunError> {
    let span = info_span!("run", strategy = name, symbol = series.symbol());
    let _guard = span.enter();

    let strategy = spec.build()?;
    let result = run_simulation(series, &strategy, config);

    for rejection in &result.rejections {
        warn!(%rejection, "order rejected");
    }

    let performance = PerformanceReport::compute(&result);
    info!(
        trades = performance.total_trades,
        final_equity = performance.final_equity,
        total_return_pct = performance.total_return_pct,
        "run complete"
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        name: name.to_string(),
        spec: spec.clone(),
        symbol: result.symbol,
        start: series.first_timestamp().date(),
        end: series.last_timestamp().date(),
        initial_cash: config.initial_cash,
        commission_rate: config.commission_rate,
        bar_count: result.bar_count,
        dataset_hash: series.content_hash(),
        config_hash: config_hash(spec, config),
        performance,
        trades: result.trades,
        equity_curve: result.equity_curve,
        events: result.events,
        rejections: result.rejections,
    })
}

/// Provider for the configured source.
pub fn build_provider(data: &DataSection) -> Result<Box<dyn DataProvider>, RunError> {
    let provider: Box<dyn DataProvider> = match data.source {
        DataSource::Synthetic => Box::new(SyntheticProvider::new(data.pattern, data.bars)),
        DataSource::Csv => {
            let path = data.path.clone().ok_or_else(|| ConfigError::InvalidParameter {
                strategy: "backtest".into(),
                param: "path".into(),
                reason: "csv source requires a file path".into(),
            })?;
            Box::new(CsvProvider::new(path))
        }
        DataSource::Yahoo => Box::new(YahooProvider::new()?),
    };
    Ok(provider)
}

/// Fetch the configured series.
pub fn load_series(data: &DataSection) -> Result<PriceSeries, RunError> {
    let provider = build_provider(data)?;
    info!(
        provider = provider.name(),
        symbol = %data.symbol,
        start = %data.start,
        end = %data.end,
        "loading price data"
    );
    let series = provider.fetch(&data.symbol, data.start, data.end)?;
    info!(bars = series.len(), "price data loaded");
    Ok(series)
}
