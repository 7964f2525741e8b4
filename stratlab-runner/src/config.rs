//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! initial_cash = 100000.0
//! commission_rate = 0.001
//! timeout_secs = 30
//!
//! [data]
//! source = "synthetic"
//! symbol = "SAMPLE"
//! start = "2023-01-01"
//! end = "2023-04-10"
//! pattern = "sample"   # sample | dips | random_walk
//! bars = 100
//!
//! [[strategy]]
//! name = "EMA_Golden_Cross_Strategy"
//! type = "ema_golden_cross"
//! fast = 5
//! slow = 20
//! ```
//!
//! Dates are quoted `YYYY-MM-DD` strings. Strategy entries are resolved one
//! at a time so a bad entry fails its own run, not the whole batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stratlab_core::data::{DataSource, SyntheticKind};
use stratlab_core::engine::EngineConfig;
use stratlab_core::strategy::{ConfigError, StrategyParams, StrategySpec};

use crate::export::{file_stem, BATCH_STEM};

/// Root of a batch config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub data: DataSection,
    #[serde(default, rename = "strategy")]
    pub strategies: Vec<StrategyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    pub initial_cash: f64,
    pub commission_rate: f64,
    /// Wall-clock limit per run. `None` runs without a limit.
    pub timeout_secs: Option<u64>,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            commission_rate: 0.001,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub source: DataSource,
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// CSV file, required when `source = "csv"`.
    pub path: Option<PathBuf>,
    /// Synthetic generator.
    pub pattern: SyntheticKind,
    /// Length of the `sample` and `dips` series. The random walk spans `start..=end`.
    pub bars: usize,
}

impl Default for DataSection {
    /// The 100-bar synthetic sample starting 2023-01-01.
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
        Self {
            source: DataSource::Synthetic,
            symbol: "SAMPLE".into(),
            start,
            end: start + chrono::Duration::days(99),
            path: None,
            pattern: SyntheticKind::Sample,
            bars: 100,
        }
    }
}

/// One `[[strategy]]` table: a strategy key plus optional parameter overrides.
///
/// Overrides sit at the top level of the table; the ones a strategy does
/// not take are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    /// Label used for artifact file names. Defaults to the strategy key.
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub fast: Option<usize>,
    pub slow: Option<usize>,
    pub signal: Option<usize>,
    pub period: Option<usize>,
    pub overbought: Option<f64>,
    pub oversold: Option<f64>,
}

impl StrategyEntry {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, params: StrategyParams) -> Self {
        Self {
            name: Some(name.into()),
            kind: kind.into(),
            fast: params.fast,
            slow: params.slow,
            signal: params.signal,
            period: params.period,
            overbought: params.overbought,
            oversold: params.oversold,
        }
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.kind.clone())
    }

    pub fn params(&self) -> StrategyParams {
        StrategyParams {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
            period: self.period,
            overbought: self.overbought,
            oversold: self.oversold,
        }
    }

    /// Resolve the key, apply overrides, and validate.
    pub fn resolve(&self) -> Result<StrategySpec, ConfigError> {
        let spec = StrategySpec::from_key(&self.kind)?.with_params(&self.params());
        spec.validate()?;
        Ok(spec)
    }
}

impl BacktestConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// BuyHold, EMA 5/20 and SMA 10/20 on the synthetic sample.
    pub fn default_batch() -> Self {
        let cross = |fast, slow| StrategyParams {
            fast: Some(fast),
            slow: Some(slow),
            ..StrategyParams::default()
        };
        Self {
            backtest: BacktestSection::default(),
            data: DataSection::default(),
            strategies: vec![
                StrategyEntry::new("BuyHold_Strategy", "BuyHold", StrategyParams::default()),
                StrategyEntry::new("EMA_Golden_Cross_Strategy", "EMAGoldenCross", cross(5, 20)),
                StrategyEntry::new("SMA_Golden_Cross_Strategy", "SMAGoldenCross", cross(10, 20)),
            ],
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.backtest.initial_cash, self.backtest.commission_rate)
    }

    /// Check run-wide settings. Strategy entries are checked per run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |param: &str, reason: String| ConfigError::InvalidParameter {
            strategy: "backtest".into(),
            param: param.into(),
            reason,
        };

        let b = &self.backtest;
        if !b.initial_cash.is_finite() || b.initial_cash <= 0.0 {
            return Err(invalid(
                "initial_cash",
                format!("{} must be positive", b.initial_cash),
            ));
        }
        if !(0.0..1.0).contains(&b.commission_rate) {
            return Err(invalid(
                "commission_rate",
                format!("{} is outside [0, 1)", b.commission_rate),
            ));
        }
        if b.timeout_secs == Some(0) {
            return Err(invalid("timeout_secs", "must be at least 1".into()));
        }

        let d = &self.data;
        if d.symbol.trim().is_empty() {
            return Err(invalid("symbol", "must not be empty".into()));
        }
        if d.start > d.end {
            return Err(invalid(
                "start",
                format!("start {} is after end {}", d.start, d.end),
            ));
        }
        if d.source == DataSource::Synthetic && d.pattern != SyntheticKind::RandomWalk && d.bars == 0 {
            return Err(invalid("bars", "synthetic series needs at least one bar".into()));
        }
        if d.source == DataSource::Csv && d.path.is_none() {
            return Err(invalid("path", "csv source requires a file path".into()));
        }

        // Names key the artifact files, so compare them as they land on disk.
        // Lowercased for case-insensitive filesystems.
        let mut seen = HashMap::new();
        for entry in &self.strategies {
            let name = entry.display_name();
            let stem = file_stem(&name).to_lowercase();
            if stem == BATCH_STEM {
                return Err(invalid(
                    "name",
                    format!("'{name}' would overwrite the batch summary"),
                ));
            }
            if let Some(first) = seen.insert(stem, name.clone()) {
                return Err(invalid(
                    "name",
                    format!("'{name}' and '{first}' map to the same artifact files"),
                ));
            }
        }
        Ok(())
    }
}
