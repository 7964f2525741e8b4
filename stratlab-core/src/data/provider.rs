//! Data provider trait.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import, synthetic series) so runs can swap sources and tests can stay offline.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::DataError;
use crate::domain::{Bar, PriceSeries};

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Synthetic,
    Csv,
    Yahoo,
}

pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` with timestamps on dates `start..=end`.
    ///
    /// Fails with `DataUnavailable` when the range yields no bars.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<PriceSeries, DataError>;
}

/// Keep bars dated inside `start..=end` and validate them into a series.
pub(crate) fn series_in_range(
    symbol: &str,
    bars: Vec<Bar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, DataError> {
    if start > end {
        return Err(DataError::DataUnavailable {
            symbol: symbol.to_string(),
            detail: format!("start {start} is after end {end}"),
        });
    }
    let bars: Vec<Bar> = bars
        .into_iter()
        .filter(|b| {
            let d = b.timestamp.date();
            d >= start && d <= end
        })
        .collect();
    if bars.is_empty() {
        return Err(DataError::DataUnavailable {
            symbol: symbol.to_string(),
            detail: format!("no bars between {start} and {end}"),
        });
    }
    PriceSeries::new(symbol, bars)
}

pub(crate) fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
