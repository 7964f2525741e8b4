//! CrossOver — marks the bar where one series overtakes another.
//!
//! +1 where a[t-1] <= b[t-1] and a[t] > b[t], -1 where a[t-1] >= b[t-1] and
//! a[t] < b[t], 0 otherwise. Any undefined input among the four reads → 0.

use super::Indicator;
use crate::domain::Bar;

pub struct CrossOver {
    a: Box<dyn Indicator>,
    b: Box<dyn Indicator>,
    name: String,
}

impl CrossOver {
    pub fn new(a: Box<dyn Indicator>, b: Box<dyn Indicator>) -> Self {
        let name = format!("cross_{}_{}", a.name(), b.name());
        Self { a, b, name }
    }
}

impl std::fmt::Debug for CrossOver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossOver").field("name", &self.name).finish()
    }
}

impl Indicator for CrossOver {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.a.lookback().max(self.b.lookback()) + 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        crossover_of(&self.a.compute(bars), &self.b.compute(bars))
    }
}

/// Crossover signal over two aligned series. Output is always defined.
pub fn crossover_of(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().min(b.len());
    let mut result = vec![0.0; n];
    for t in 1..n {
        let (pa, pb, ca, cb) = (a[t - 1], b[t - 1], a[t], b[t]);
        if pa.is_nan() || pb.is_nan() || ca.is_nan() || cb.is_nan() {
            continue;
        }
        if pa <= pb && ca > cb {
            result[t] = 1.0;
        } else if pa >= pb && ca < cb {
            result[t] = -1.0;
        }
    }
    result
}
