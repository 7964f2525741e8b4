//! CSV import of daily or intraday OHLCV bars.
//!
//! Expects a header row. Column names are matched case-insensitively:
//! a timestamp column (`date`, `datetime` or `timestamp`) plus `open`, `high`,
//! `low`, `close` and `volume`. Extra columns (e.g. `Adj Close`) are ignored.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use super::provider::{midnight, series_in_range, DataProvider};
use super::DataError;
use crate::domain::{Bar, PriceSeries};

#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let file = std::fs::File::open(&self.path)?;
        let bars = read_bars(symbol, file)?;
        series_in_range(symbol, bars, start, end)
    }
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(symbol: &str, headers: &csv::StringRecord) -> Result<Self, DataError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| DataError::InvalidBar {
                    symbol: symbol.to_string(),
                    row: 0,
                    detail: format!("missing column '{}'", names[0]),
                })
        };
        Ok(Self {
            timestamp: find(&["date", "datetime", "timestamp"])?,
            open: find(&["open"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
            volume: find(&["volume"])?,
        })
    }
}

/// Parse OHLCV rows from any reader. Rows keep file order.
pub fn read_bars<R: std::io::Read>(symbol: &str, reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let cols = Columns::locate(symbol, rdr.headers()?)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let invalid = |detail: String| DataError::InvalidBar {
            symbol: symbol.to_string(),
            row,
            detail,
        };
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let number = |idx: usize, name: &str| {
            field(idx)
                .parse::<f64>()
                .map_err(|_| invalid(format!("{name} '{}' is not a number", field(idx))))
        };

        let timestamp = parse_timestamp(field(cols.timestamp))
            .ok_or_else(|| invalid(format!("unrecognized timestamp '{}'", field(cols.timestamp))))?;
        let bar = Bar {
            timestamp,
            open: number(cols.open, "open")?,
            high: number(cols.high, "high")?,
            low: number(cols.low, "low")?,
            close: number(cols.close, "close")?,
            // Some exports write volume as a float.
            volume: number(cols.volume, "volume")?.max(0.0).round() as u64,
        };
        if !bar.is_sane() {
            return Err(invalid(format!(
                "inconsistent prices o={} h={} l={} c={}",
                bar.open, bar.high, bar.low, bar.close
            )));
        }
        bars.push(bar);
    }
    Ok(bars)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(midnight))
}
