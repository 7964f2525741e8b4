//! Strategy policies: per-bar decision functions over precomputed indicators.
//!
//! A policy sees the current bar, the ledger's position and cash, and the
//! indicator values up to the current bar. It never sees future bars and
//! never mutates anything; the simulator turns its `Action` into an order.

pub mod buy_hold;
pub mod golden_cross;
pub mod macd;
pub mod rsi;
pub mod spec;

pub use buy_hold::BuyHold;
pub use golden_cross::{GoldenCross, MaKind};
pub use macd::MacdCross;
pub use rsi::RsiReversion;
pub use spec::{ConfigError, StrategyParams, StrategySpec};

use crate::domain::{Bar, OrderSize, Position};
use crate::indicators::{Indicator, IndicatorValues};
use serde::{Deserialize, Serialize};

/// What a policy wants done, filled at the next bar's open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Hold,
    /// Open a long position.
    Buy(OrderSize),
    /// Open a short position.
    Sell(OrderSize),
    /// Flatten the open position.
    Close,
}

/// Everything a policy may look at for the current bar.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub bar_index: usize,
    pub bar: &'a Bar,
    pub position: &'a Position,
    pub cash: f64,
    pub is_last_bar: bool,
}

/// Per-bar decision function.
pub trait StrategyPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Indicators to precompute before the bar loop.
    fn indicators(&self) -> Vec<Box<dyn Indicator>>;

    /// Pure decision for the current bar. Undefined indicators mean `Hold`.
    fn decide(&self, ctx: &PolicyContext<'_>, indicators: &IndicatorValues) -> Action;
}

/// The closed set of runtime strategies, built from a [`StrategySpec`].
#[derive(Debug, Clone)]
pub enum Strategy {
    BuyHold(BuyHold),
    SmaGoldenCross(GoldenCross),
    EmaGoldenCross(GoldenCross),
    MacdCross(MacdCross),
    RsiReversion(RsiReversion),
}

impl Strategy {
    fn policy(&self) -> &dyn StrategyPolicy {
        match self {
            Strategy::BuyHold(s) => s,
            Strategy::SmaGoldenCross(s) | Strategy::EmaGoldenCross(s) => s,
            Strategy::MacdCross(s) => s,
            Strategy::RsiReversion(s) => s,
        }
    }
}

impl StrategyPolicy for Strategy {
    fn name(&self) -> &str {
        self.policy().name()
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        self.policy().indicators()
    }

    fn decide(&self, ctx: &PolicyContext<'_>, indicators: &IndicatorValues) -> Action {
        self.policy().decide(ctx, indicators)
    }
}

/// Close on the last bar whenever a position is open.
pub(crate) fn last_bar_close(ctx: &PolicyContext<'_>) -> Option<Action> {
    (ctx.is_last_bar && !ctx.position.is_flat()).then_some(Action::Close)
}
