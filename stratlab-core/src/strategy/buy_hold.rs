//! Buy-and-hold: go long with all cash on the first bar, never exit early.

use super::{Action, PolicyContext, StrategyPolicy};
use crate::domain::OrderSize;
use crate::indicators::{Indicator, IndicatorValues};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuyHold;

impl StrategyPolicy for BuyHold {
    fn name(&self) -> &str {
        "BuyHold"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        Vec::new()
    }

    fn decide(&self, ctx: &PolicyContext<'_>, _indicators: &IndicatorValues) -> Action {
        if ctx.bar_index == 0 && ctx.position.is_flat() {
            Action::Buy(OrderSize::AllCash)
        } else {
            Action::Hold
        }
    }
}
