//! Price data acquisition.
//!
//! Every source implements [`DataProvider`] and returns a validated
//! [`PriceSeries`](crate::domain::PriceSeries); the engine never sees raw rows.

pub mod csv_file;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_file::CsvProvider;
pub use provider::{DataProvider, DataSource};
pub use synthetic::{SyntheticKind, SyntheticProvider};
pub use yahoo::YahooProvider;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Structured error types for data operations. All are fatal to the run.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data for '{symbol}': {detail}")]
    DataUnavailable { symbol: String, detail: String },

    #[error("bars for '{symbol}' out of order at index {index} ({timestamp})")]
    UnorderedBars {
        symbol: String,
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("invalid bar for '{symbol}' at row {row}: {detail}")]
    InvalidBar {
        symbol: String,
        row: usize,
        detail: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormat(String),
}
