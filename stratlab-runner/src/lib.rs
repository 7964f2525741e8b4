//! StratLab Runner — backtest orchestration on top of `stratlab-core`.
//!
//! This crate provides:
//! - TOML batch configuration
//! - Single runs over a pre-loaded series, with tracing spans per run
//! - Batch mode: rayon fan-out with per-run timeouts and isolated failures
//! - Performance metrics (returns, Sharpe, drawdown, SQN)
//! - Deterministic CSV / JSON / JSON-lines artifact export

pub mod batch;
pub mod config;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, run_batch_on, BatchOutcome, BatchReport};
pub use config::{BacktestConfig, BacktestSection, DataSection, StrategyEntry};
pub use export::{save_artifacts, save_batch_artifacts, ArtifactPaths};
pub use logging::{init_tracing, LogFormat};
pub use metrics::PerformanceReport;
pub use runner::{load_series, run_backtest, BacktestReport, RunError, SCHEMA_VERSION};
