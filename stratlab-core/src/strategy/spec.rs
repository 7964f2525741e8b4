//! Serializable strategy configuration and its validation.
//!
//! A `StrategySpec` is plain data: it can come from a TOML file, a CLI key
//! plus overrides, or a manifest. `build()` validates it and produces the
//! runtime [`Strategy`](super::Strategy).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BuyHold, GoldenCross, MaKind, MacdCross, RsiReversion, Strategy};

/// Errors raised while resolving or validating a strategy configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{param}' for {strategy}: {reason}")]
    InvalidParameter {
        strategy: String,
        param: String,
        reason: String,
    },

    #[error("unknown strategy '{0}' (try `stratlab strategies`)")]
    UnknownStrategy(String),

    #[error("configuration parse error: {0}")]
    Parse(String),
}

/// Closed set of strategy variants with their parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategySpec {
    BuyHold,
    SmaGoldenCross {
        fast: usize,
        slow: usize,
    },
    EmaGoldenCross {
        fast: usize,
        slow: usize,
    },
    MacdCross {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    RsiReversion {
        period: usize,
        overbought: f64,
        oversold: f64,
    },
}

/// Optional per-parameter overrides applied on top of a variant's defaults.
///
/// Overrides that the variant does not take are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub fast: Option<usize>,
    pub slow: Option<usize>,
    pub signal: Option<usize>,
    pub period: Option<usize>,
    pub overbought: Option<f64>,
    pub oversold: Option<f64>,
}

impl StrategySpec {
    pub const fn sma_golden_cross_default() -> Self {
        StrategySpec::SmaGoldenCross { fast: 50, slow: 200 }
    }

    pub const fn ema_golden_cross_default() -> Self {
        StrategySpec::EmaGoldenCross { fast: 12, slow: 26 }
    }

    pub const fn macd_default() -> Self {
        StrategySpec::MacdCross {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }

    pub const fn rsi_default() -> Self {
        StrategySpec::RsiReversion {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }

    /// Every variant with its default parameters.
    pub fn catalog() -> Vec<StrategySpec> {
        vec![
            StrategySpec::BuyHold,
            Self::sma_golden_cross_default(),
            Self::ema_golden_cross_default(),
            Self::macd_default(),
            Self::rsi_default(),
        ]
    }

    /// Resolve a strategy key to its default spec.
    ///
    /// Accepts the canonical keys (`BuyHold`, `SMAGoldenCross`, `EMAGoldenCross`,
    /// `MACDStrategy`, `RSIStrategy`) and snake-case aliases, case-insensitively.
    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "buyhold" | "buyandhold" => Ok(StrategySpec::BuyHold),
            "smagoldencross" | "smacross" | "sma" => Ok(Self::sma_golden_cross_default()),
            "emagoldencross" | "emacross" | "ema" => Ok(Self::ema_golden_cross_default()),
            "macdstrategy" | "macdcross" | "macd" => Ok(Self::macd_default()),
            "rsistrategy" | "rsireversion" | "rsi" => Ok(Self::rsi_default()),
            _ => Err(ConfigError::UnknownStrategy(key.to_string())),
        }
    }

    /// Canonical key for this variant.
    pub fn key(&self) -> &'static str {
        match self {
            StrategySpec::BuyHold => "BuyHold",
            StrategySpec::SmaGoldenCross { .. } => "SMAGoldenCross",
            StrategySpec::EmaGoldenCross { .. } => "EMAGoldenCross",
            StrategySpec::MacdCross { .. } => "MACDStrategy",
            StrategySpec::RsiReversion { .. } => "RSIStrategy",
        }
    }

    /// Human-readable parameter list, e.g. `fast=12 slow=26`.
    pub fn describe_params(&self) -> String {
        match self {
            StrategySpec::BuyHold => String::new(),
            StrategySpec::SmaGoldenCross { fast, slow }
            | StrategySpec::EmaGoldenCross { fast, slow } => format!("fast={fast} slow={slow}"),
            StrategySpec::MacdCross { fast, slow, signal } => {
                format!("fast={fast} slow={slow} signal={signal}")
            }
            StrategySpec::RsiReversion {
                period,
                overbought,
                oversold,
            } => format!("period={period} overbought={overbought} oversold={oversold}"),
        }
    }

    /// Apply overrides, keeping defaults for anything not given.
    pub fn with_params(self, p: &StrategyParams) -> Self {
        match self {
            StrategySpec::BuyHold => StrategySpec::BuyHold,
            StrategySpec::SmaGoldenCross { fast, slow } => StrategySpec::SmaGoldenCross {
                fast: p.fast.unwrap_or(fast),
                slow: p.slow.unwrap_or(slow),
            },
            StrategySpec::EmaGoldenCross { fast, slow } => StrategySpec::EmaGoldenCross {
                fast: p.fast.unwrap_or(fast),
                slow: p.slow.unwrap_or(slow),
            },
            StrategySpec::MacdCross { fast, slow, signal } => StrategySpec::MacdCross {
                fast: p.fast.unwrap_or(fast),
                slow: p.slow.unwrap_or(slow),
                signal: p.signal.unwrap_or(signal),
            },
            StrategySpec::RsiReversion {
                period,
                overbought,
                oversold,
            } => StrategySpec::RsiReversion {
                period: p.period.unwrap_or(period),
                overbought: p.overbought.unwrap_or(overbought),
                oversold: p.oversold.unwrap_or(oversold),
            },
        }
    }

    /// Reject parameter sets that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.key();
        let invalid = |param: &str, reason: String| ConfigError::InvalidParameter {
            strategy: key.to_string(),
            param: param.to_string(),
            reason,
        };
        let positive = |param: &str, v: usize| {
            if v == 0 {
                Err(invalid(param, "period must be >= 1".into()))
            } else {
                Ok(())
            }
        };
        let ordered = |fast: usize, slow: usize| {
            if fast >= slow {
                Err(invalid(
                    "fast",
                    format!("fast period ({fast}) must be less than slow period ({slow})"),
                ))
            } else {
                Ok(())
            }
        };

        match *self {
            StrategySpec::BuyHold => Ok(()),
            StrategySpec::SmaGoldenCross { fast, slow }
            | StrategySpec::EmaGoldenCross { fast, slow } => {
                positive("fast", fast)?;
                positive("slow", slow)?;
                ordered(fast, slow)
            }
            StrategySpec::MacdCross { fast, slow, signal } => {
                positive("fast", fast)?;
                positive("slow", slow)?;
                positive("signal", signal)?;
                ordered(fast, slow)
            }
            StrategySpec::RsiReversion {
                period,
                overbought,
                oversold,
            } => {
                positive("period", period)?;
                for (param, v) in [("overbought", overbought), ("oversold", oversold)] {
                    if !(0.0..=100.0).contains(&v) {
                        return Err(invalid(param, format!("{v} is outside [0, 100]")));
                    }
                }
                if oversold >= overbought {
                    return Err(invalid(
                        "oversold",
                        format!("oversold ({oversold}) must be below overbought ({overbought})"),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Validate and construct the runtime strategy.
    pub fn build(&self) -> Result<Strategy, ConfigError> {
        self.validate()?;
        Ok(match *self {
            StrategySpec::BuyHold => Strategy::BuyHold(BuyHold),
            StrategySpec::SmaGoldenCross { fast, slow } => {
                Strategy::SmaGoldenCross(GoldenCross::new(MaKind::Sma, fast, slow))
            }
            StrategySpec::EmaGoldenCross { fast, slow } => {
                Strategy::EmaGoldenCross(GoldenCross::new(MaKind::Ema, fast, slow))
            }
            StrategySpec::MacdCross { fast, slow, signal } => {
                Strategy::MacdCross(MacdCross::new(fast, slow, signal))
            }
            StrategySpec::RsiReversion {
                period,
                overbought,
                oversold,
            } => Strategy::RsiReversion(RsiReversion::new(period, overbought, oversold)),
        })
    }
}
