//! Canonical in-memory representation of a daily OHLCV bar.
//!
//! This struct is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! implementation and the row shape written by [`CsvSink`](crate::io::csv_sink::CsvSink).
//! Provider-specific extras (trade count, VWAP, ...) are dropped before a `Bar` is built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single trading-day observation for one symbol.
///
/// Serde field names match the exported CSV header, and field order is the column order:
/// `Date, Symbol, Open, High, Low, Close, Volume`.
///
/// `low <= open, close <= high` is trusted from the provider and not checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date (the UTC calendar date of the provider timestamp).
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    /// Ticker this bar belongs to, e.g. "AAPL".
    #[serde(rename = "Symbol")]
    pub symbol: String,

    /// Opening price.
    #[serde(rename = "Open")]
    pub open: f64,

    /// Highest price during the session.
    #[serde(rename = "High")]
    pub high: f64,

    /// Lowest price during the session.
    #[serde(rename = "Low")]
    pub low: f64,

    /// Closing price.
    #[serde(rename = "Close")]
    pub close: f64,

    /// Shares traded during the session.
    #[serde(rename = "Volume")]
    pub volume: u64,
}
