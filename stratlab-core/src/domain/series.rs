//! PriceSeries — an ordered, immutable sequence of bars for one symbol.

use chrono::NaiveDateTime;

use super::bar::Bar;
use crate::data::DataError;

/// Bars for a single instrument, strictly increasing by timestamp.
///
/// The bar vector is private; after construction the series can only be read.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate and wrap a bar sequence.
    ///
    /// Fails with `DataUnavailable` when `bars` is empty and with
    /// `UnorderedBars` on the first timestamp that does not strictly increase.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(DataError::DataUnavailable {
                symbol,
                detail: "no bars".into(),
            });
        }
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(DataError::UnorderedBars {
                    symbol,
                    index: i + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.bars[self.bars.len() - 1].timestamp
    }

    /// Close prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Restrict to bars whose timestamp falls inside `[start, end]`.
    pub fn slice_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<PriceSeries, DataError> {
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .cloned()
            .collect();
        if bars.is_empty() {
            return Err(DataError::DataUnavailable {
                symbol: self.symbol.clone(),
                detail: format!("no bars between {start} and {end}"),
            });
        }
        Ok(Self {
            symbol: self.symbol.clone(),
            bars,
        })
    }

    /// Deterministic BLAKE3 hash over every bar, used to fingerprint runs.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for bar in &self.bars {
            hasher.update(bar.timestamp.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars(n: usize) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| Bar {
                timestamp: base + Duration::days(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn empty_series_is_unavailable() {
        let err = PriceSeries::new("SPY", vec![]).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let mut b = bars(3);
        b[2].timestamp = b[1].timestamp;
        let err = PriceSeries::new("SPY", b).unwrap_err();
        assert!(matches!(err, DataError::UnorderedBars { index: 2, .. }));
    }

    #[test]
    fn slice_range_filters_inclusive() {
        let series = PriceSeries::new("SPY", bars(10)).unwrap();
        let start = series.bars()[2].timestamp;
        let end = series.bars()[5].timestamp;
        let sliced = series.slice_range(start, end).unwrap();
        assert_eq!(sliced.len(), 4);
        assert_eq!(sliced.first_timestamp(), start);
        assert_eq!(sliced.last_timestamp(), end);
    }

    #[test]
    fn slice_range_outside_is_unavailable() {
        let series = PriceSeries::new("SPY", bars(5)).unwrap();
        let late = series.last_timestamp() + Duration::days(30);
        let err = series.slice_range(late, late + Duration::days(5)).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn content_hash_is_stable() {
        let a = PriceSeries::new("SPY", bars(5)).unwrap();
        let b = PriceSeries::new("SPY", bars(5)).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        let c = PriceSeries::new("QQQ", bars(5)).unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
