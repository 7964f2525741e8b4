//! Indicator engine.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! They are precomputed once before the bar loop and queried per bar through
//! [`IndicatorValues`]. No recomputation on each bar.
//!
//! Multi-output indicators (MACD) are exposed as separate named instances per
//! output, keeping the single-series `Indicator` trait unchanged.

pub mod crossover;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use crossover::CrossOver;
pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;
use std::collections::HashMap;
use thiserror::Error;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. Undefined (warm-up) values are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Series key (e.g., "sma_20", "macd_signal_12_26_9").
    fn name(&self) -> &str;

    /// Index of the first bar that can carry a defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Why an indicator value could not be read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("indicator '{name}' has no value yet at bar {bar_index} (warm-up)")]
    WarmupIncomplete { name: String, bar_index: usize },

    #[error("indicator '{name}' was not precomputed")]
    UnknownSeries { name: String },

    #[error("bar {bar_index} is beyond indicator '{name}' (len {len})")]
    OutOfRange {
        name: String,
        bar_index: usize,
        len: usize,
    },
}

/// Container for precomputed indicator values.
///
/// Built once before the bar loop, then queried by bar index during the loop.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Raw value at a bar index; NaN for warm-up, `None` when absent.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Defined value at a bar index.
    ///
    /// Warm-up NaN surfaces as `IndicatorError::WarmupIncomplete` so a caller
    /// can never mistake an undefined value for a number.
    pub fn value(&self, name: &str, bar_index: usize) -> Result<f64, IndicatorError> {
        let series = self
            .series
            .get(name)
            .ok_or_else(|| IndicatorError::UnknownSeries { name: name.into() })?;
        let v = series
            .get(bar_index)
            .copied()
            .ok_or_else(|| IndicatorError::OutOfRange {
                name: name.into(),
                bar_index,
                len: series.len(),
            })?;
        if v.is_nan() {
            return Err(IndicatorError::WarmupIncomplete {
                name: name.into(),
                bar_index,
            });
        }
        Ok(v)
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Compute every indicator over `bars`, keyed by `Indicator::name`.
///
/// Duplicate names are computed once.
pub fn precompute_indicators(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let mut values = IndicatorValues::new();
    for ind in indicators {
        if values.get_series(ind.name()).is_some() {
            continue;
        }
        values.insert(ind.name(), ind.compute(bars));
    }
    values
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
