//! MACD crossover: long when the MACD line crosses above its signal line,
//! flat when it crosses back below.

use super::{Action, PolicyContext, StrategyPolicy};
use crate::domain::OrderSize;
use crate::indicators::{CrossOver, Indicator, IndicatorValues, Macd};

#[derive(Debug, Clone)]
pub struct MacdCross {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    cross_key: String,
}

impl MacdCross {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        let mut s = Self {
            fast,
            slow,
            signal,
            cross_key: String::new(),
        };
        s.cross_key = s.cross().name().to_string();
        s
    }

    fn cross(&self) -> CrossOver {
        CrossOver::new(
            Box::new(Macd::line(self.fast, self.slow, self.signal)),
            Box::new(Macd::signal(self.fast, self.slow, self.signal)),
        )
    }
}

impl StrategyPolicy for MacdCross {
    fn name(&self) -> &str {
        "MACDStrategy"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            Box::new(Macd::line(self.fast, self.slow, self.signal)),
            Box::new(Macd::signal(self.fast, self.slow, self.signal)),
            Box::new(self.cross()),
        ]
    }

    fn decide(&self, ctx: &PolicyContext<'_>, indicators: &IndicatorValues) -> Action {
        let Ok(cross) = indicators.value(&self.cross_key, ctx.bar_index) else {
            return Action::Hold;
        };
        if ctx.position.is_flat() && cross > 0.0 {
            Action::Buy(OrderSize::AllCash)
        } else if ctx.position.is_long() && cross < 0.0 {
            Action::Close
        } else {
            Action::Hold
        }
    }
}
