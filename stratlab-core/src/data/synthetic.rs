//! Deterministic synthetic price series for demos, tests, and offline runs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::provider::{midnight, series_in_range, DataProvider};
use super::DataError;
use crate::domain::{Bar, PriceSeries};

/// Which generator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticKind {
    /// Gentle uptrend with a 5-bar ripple, daily bars from `start`.
    Sample,
    /// Uptrend with a 5-point dip every tenth bar, daily bars from `start`.
    Dips,
    /// Seeded random walk over weekdays, seed derived from the symbol.
    RandomWalk,
}

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    kind: SyntheticKind,
    bars: usize,
}

impl SyntheticProvider {
    pub fn new(kind: SyntheticKind, bars: usize) -> Self {
        Self { kind, bars }
    }

    /// The 100-bar sample series.
    pub fn sample() -> Self {
        Self::new(SyntheticKind::Sample, 100)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let bars = match self.kind {
            SyntheticKind::Sample => sample_bars(start, self.bars),
            SyntheticKind::Dips => dip_bars(start, self.bars),
            SyntheticKind::RandomWalk => random_walk_bars(symbol, start, end),
        };
        series_in_range(symbol, bars, start, end)
    }
}

/// Build daily bars from open prices: close drifts +0.1% on even bars and
/// -0.1% on odd bars, high/low sit 0.5 outside the body.
fn bars_from_opens(start: NaiveDate, opens: impl Iterator<Item = f64>) -> Vec<Bar> {
    opens
        .enumerate()
        .map(|(i, open)| {
            let drift = if i % 2 == 0 { 0.001 } else { -0.001 };
            let close = open * (1.0 + drift);
            Bar {
                timestamp: midnight(start + Duration::days(i as i64)),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume: 1000 + i as u64 * 10,
            }
        })
        .collect()
}

/// `open[i] = 100 + 0.5 i + 0.5 ((i mod 5) - 2)`.
pub fn sample_bars(start: NaiveDate, n: usize) -> Vec<Bar> {
    bars_from_opens(
        start,
        (0..n).map(|i| 100.0 + i as f64 * 0.5 + 0.5 * ((i % 5) as f64 - 2.0)),
    )
}

/// `open[i] = 100 + 0.5 i`, minus 5 on every tenth bar.
pub fn dip_bars(start: NaiveDate, n: usize) -> Vec<Bar> {
    bars_from_opens(
        start,
        (0..n).map(|i| {
            let base = 100.0 + i as f64 * 0.5;
            if i % 10 == 0 {
                base - 5.0
            } else {
                base
            }
        }),
    )
}

/// Weekday random walk starting at 100 with +/-3% daily moves.
///
/// The RNG seed is the BLAKE3 hash of the symbol, so the same symbol and
/// range always produce the same bars.
pub fn random_walk_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            timestamp: midnight(current),
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[test]
    fn sample_series_shape() {
        let bars = sample_bars(jan1(), 100);
        assert_eq!(bars.len(), 100);
        // i = 0: 100 + 0 + 0.5 * (0 - 2) = 99
        assert_eq!(bars[0].open, 99.0);
        assert!((bars[0].close - 99.0 * 1.001).abs() < 1e-12);
        // i = 7: 100 + 3.5 + 0.5 * (2 - 2) = 103.5
        assert_eq!(bars[7].open, 103.5);
        assert!((bars[7].close - 103.5 * 0.999).abs() < 1e-12);
        assert_eq!(bars[99].volume, 1990);
        assert!(bars.iter().all(|b| b.is_sane()));
    }

    #[test]
    fn dip_series_dips_every_tenth_bar() {
        let bars = dip_bars(jan1(), 30);
        assert_eq!(bars[10].open, 100.0);
        assert_eq!(bars[11].open, 105.5);
    }

    #[test]
    fn random_walk_is_deterministic_and_skips_weekends() {
        let end = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        let a = random_walk_bars("SPY", jan1(), end);
        let b = random_walk_bars("SPY", jan1(), end);
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|bar| !matches!(bar.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
        let c = random_walk_bars("QQQ", jan1(), end);
        assert_ne!(a[1].close, c[1].close);
    }

    #[test]
    fn provider_respects_end_date() {
        let end = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let series = SyntheticProvider::sample().fetch("SAMPLE", jan1(), end).unwrap();
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn provider_empty_range_is_unavailable() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 7).unwrap(); // Saturday
        let end = NaiveDate::from_ymd_opt(2023, 1, 8).unwrap();
        let err = SyntheticProvider::new(SyntheticKind::RandomWalk, 0)
            .fetch("SPY", start, end)
            .unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }
}
