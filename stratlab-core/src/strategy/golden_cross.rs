//! Moving average golden cross: long on fast-over-slow, flat on the reverse.
//!
//! # Indicator dependencies
//! - Fast: `{ma}_{fast}` (e.g., `sma_50`)
//! - Slow: `{ma}_{slow}` (e.g., `sma_200`)
//! - Cross: `cross_{ma}_{fast}_{ma}_{slow}`

use super::{last_bar_close, Action, PolicyContext, StrategyPolicy};
use crate::domain::OrderSize;
use crate::indicators::{CrossOver, Ema, Indicator, IndicatorValues, Sma};

/// Moving average type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    fn build(self, period: usize) -> Box<dyn Indicator> {
        match self {
            MaKind::Sma => Box::new(Sma::new(period)),
            MaKind::Ema => Box::new(Ema::new(period)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoldenCross {
    pub kind: MaKind,
    pub fast: usize,
    pub slow: usize,
    cross_key: String,
}

impl GoldenCross {
    /// Callers validate `fast < slow` through `StrategySpec::build`.
    pub fn new(kind: MaKind, fast: usize, slow: usize) -> Self {
        let cross = CrossOver::new(kind.build(fast), kind.build(slow));
        Self {
            kind,
            fast,
            slow,
            cross_key: cross.name().to_string(),
        }
    }
}

impl StrategyPolicy for GoldenCross {
    fn name(&self) -> &str {
        match self.kind {
            MaKind::Sma => "SMAGoldenCross",
            MaKind::Ema => "EMAGoldenCross",
        }
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![
            self.kind.build(self.fast),
            self.kind.build(self.slow),
            Box::new(CrossOver::new(
                self.kind.build(self.fast),
                self.kind.build(self.slow),
            )),
        ]
    }

    fn decide(&self, ctx: &PolicyContext<'_>, indicators: &IndicatorValues) -> Action {
        if let Some(close) = last_bar_close(ctx) {
            return close;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Position;
    use crate::strategy::test_support::*;

    fn sma(fast: usize, slow: usize) -> GoldenCross {
        GoldenCross::new(MaKind::Sma, fast, slow)
    }

    #[test]
    fn buys_on_upward_cross_when_flat() {
        let s = sma(10, 20);
        let b = bar();
        let flat = Position::flat();
        let iv = single("cross_sma_10_sma_20", 1.0);
        assert_eq!(
            s.decide(&ctx(&b, &flat, 1), &iv),
            Action::Buy(OrderSize::AllCash)
        );
    }

    #[test]
    fn closes_long_on_downward_cross() {
        let s = sma(10, 20);
        let b = bar();
        let pos = long();
        let iv = single("cross_sma_10_sma_20", -1.0);
        assert_eq!(s.decide(&ctx(&b, &pos, 1), &iv), Action::Close);

        let flat = Position::flat();
        assert_eq!(s.decide(&ctx(&b, &flat, 1), &iv), Action::Hold);
    }

    #[test]
    fn no_cross_or_warmup_holds() {
        let s = GoldenCross::new(MaKind::Ema, 5, 20);
        let b = bar();
        let flat = Position::flat();
        let iv = single("cross_ema_5_ema_20", 0.0);
        assert_eq!(s.decide(&ctx(&b, &flat, 1), &iv), Action::Hold);
        // Missing series behaves like warm-up.
        assert_eq!(
            s.decide(&ctx(&b, &flat, 1), &IndicatorValues::new()),
            Action::Hold
        );
    }

    #[test]
    fn last_bar_closes_open_position() {
        let s = sma(10, 20);
        let b = bar();
        let pos = long();
        let mut c = ctx(&b, &pos, 1);
        c.is_last_bar = true;
        assert_eq!(s.decide(&c, &IndicatorValues::new()), Action::Close);
    }
}
