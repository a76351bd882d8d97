use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{bar_series::BarSeries, time_range::TimeRange};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The symbol cannot be used as part of a file name.
    #[snafu(display("Symbol {symbol:?} cannot be used as a file name"))]
    InvalidSymbol {
        symbol: String,
        backtrace: Backtrace,
    },

    /// An I/O error while creating, reading or listing `path`.
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A row could not be encoded or decoded.
    #[snafu(display("CSV error in {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// The file parsed but does not hold a single-symbol export.
    #[snafu(display("Malformed export {}: {message}", path.display()))]
    Malformed {
        path: PathBuf,
        message: String,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the path it wrote; a database sink could return
    /// the number of rows inserted.
    type Output;

    /// Persists one symbol's series for the run covering `run_range`.
    ///
    /// Implementations sort and deduplicate by date before writing, so
    /// writing the same series twice yields the same result.
    async fn write(
        &self,
        series: &BarSeries,
        run_range: &TimeRange,
    ) -> Result<Self::Output, SinkError>;
}
