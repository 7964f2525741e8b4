//! RSI mean reversion: buy oversold, short overbought, exit at the opposite extreme.

use super::{last_bar_close, Action, PolicyContext, StrategyPolicy};
use crate::domain::OrderSize;
use crate::indicators::{Indicator, IndicatorValues, Rsi};

#[derive(Debug, Clone)]
pub struct RsiReversion {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
    key: String,
}

impl RsiReversion {
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        Self {
            period,
            overbought,
            oversold,
            key: Rsi::new(period).name().to_string(),
        }
    }
}

impl StrategyPolicy for RsiReversion {
    fn name(&self) -> &str {
        "RSIStrategy"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Rsi::new(self.period))]
    }

    fn decide(&self, ctx: &PolicyContext<'_>, indicators: &IndicatorValues) -> Action {
        if let Some(close) = last_bar_close(ctx) {
            return close;
        }
        let Ok(rsi) = indicators.value(&self.key, ctx.bar_index) else {
            return Action::Hold;
        };
        let pos = ctx.position;
        if pos.is_long() && rsi > self.overbought {
            Action::Close
        } else if pos.is_short() && rsi < self.oversold {
            Action::Close
        } else if pos.is_flat() && rsi < self.oversold {
            Action::Buy(OrderSize::AllCash)
        } else if pos.is_flat() && rsi > self.overbought {
            Action::Sell(OrderSize::AllCash)
        } else {
            Action::Hold
        }
    }
}
