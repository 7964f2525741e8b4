//! Batch mode — run every configured strategy over one shared series.
//!
//! Data is loaded once; runs fan out over rayon. Each run yields its own
//! `Result`, so a bad entry, a panic, or a timeout never aborts its siblings.
//! Outcomes keep the config's entry order.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{info, warn};

use stratlab_core::domain::PriceSeries;
use stratlab_core::engine::EngineConfig;
use stratlab_core::strategy::StrategySpec;

use crate::config::{BacktestConfig, StrategyEntry};
use crate::runner::{load_series, run_backtest, BacktestReport, RunError};

/// Outcome of one configured run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub result: Result<BacktestReport, RunError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// All outcomes of a batch, in config order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &BacktestReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures() == 0
    }
}

/// Load the configured series, then run every strategy entry.
///
/// Only a data failure fails the whole batch; per-run failures land in the
/// returned outcomes.
pub fn run_batch(config: &BacktestConfig) -> Result<BatchReport, RunError> {
    let series = Arc::new(load_series(&config.data)?);
    Ok(run_batch_on(config, series))
}

/// Run every strategy entry over an already-loaded series.
pub fn run_batch_on(config: &BacktestConfig, series: Arc<PriceSeries>) -> BatchReport {
    let engine = config.engine_config();
    let timeout = config.backtest.timeout_secs.map(Duration::from_secs);

    let outcomes: Vec<BatchOutcome> = config
        .strategies
        .par_iter()
        .map(|entry| {
            let name = entry.display_name();
            let result = run_entry(entry, &series, &engine, timeout);
            if let Err(e) = &result {
                warn!(strategy = %name, error = %e, "run failed");
            }
            BatchOutcome { name, result }
        })
        .collect();

    let report = BatchReport { outcomes };
    info!(
        runs = report.outcomes.len(),
        failures = report.failures(),
        "batch complete"
    );
    report
}

fn run_entry(
    entry: &StrategyEntry,
    series: &Arc<PriceSeries>,
    engine: &EngineConfig,
    timeout: Option<Duration>,
) -> Result<BacktestReport, RunError> {
    let spec = entry.resolve()?;
    let name = entry.display_name();
    match timeout {
        Some(limit) => run_with_timeout(name, spec, Arc::clone(series), engine.clone(), limit),
        None => catch_unwind(AssertUnwindSafe(|| {
            run_backtest(&name, &spec, series, engine)
        }))
        .unwrap_or_else(|payload| Err(RunError::Panicked(panic_message(payload.as_ref())))),
    }
}

/// Run on a dedicated thread and stop waiting after `limit`.
///
/// A timed-out worker is detached; its result is dropped when it finishes.
fn run_with_timeout(
    name: String,
    spec: StrategySpec,
    series: Arc<PriceSeries>,
    engine: EngineConfig,
    limit: Duration,
) -> Result<BacktestReport, RunError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(format!("run-{name}"))
        .spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send(run_backtest(&name, &spec, &series, &engine));
        })
        .map_err(|e| RunError::Panicked(format!("failed to spawn run thread: {e}")))?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(RunError::Timeout {
            secs: limit.as_secs(),
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunError::Panicked(
            "run thread exited without a result".into(),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
