//! A collection of daily bars for a single symbol.

use chrono::NaiveDate;

use crate::models::{bar::Bar, timeframe::TimeFrame};

/// Represents the price history of a single symbol.
///
/// A series is built chunk by chunk while its windows are fetched and is only
/// guaranteed to be strictly increasing by date after [`BarSeries::finalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: Vec::new(),
        }
    }

    pub fn with_bars(symbol: impl Into<String>, timeframe: TimeFrame, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Appends one chunk of bars, keeping arrival order.
    pub fn append(&mut self, bars: Vec<Bar>) {
        self.bars.extend(bars);
    }

    /// Sorts ascending by date and drops repeated dates, keeping the first
    /// occurrence. Idempotent.
    pub fn finalize(&mut self) {
        // stable sort so the first-fetched duplicate survives
        self.bars.sort_by_key(|bar| bar.date);
        self.bars.dedup_by_key(|bar| bar.date);
    }

    /// Consuming variant of [`BarSeries::finalize`].
    pub fn finalized(mut self) -> Self {
        self.finalize();
        self
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).max()
    }
}
