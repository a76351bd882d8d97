//! Per-symbol assembly: plan windows, fetch them in order, stitch the rows.

use std::{num::NonZeroU32, sync::Arc};

use crate::{
    models::{bar_series::BarSeries, time_range::TimeRange, timeframe::TimeFrame},
    requests::historical::{
        chunk::{ChunkFetcher, ChunkOutcome},
        pacing::Pacer,
        window::plan_range,
    },
};

/// What one symbol's pass over its windows produced.
#[derive(Debug)]
pub struct Assembly {
    /// Concatenated rows in window order, or `None` if no window had data.
    pub series: Option<BarSeries>,
    pub windows: usize,
    pub empty_windows: usize,
    pub failed_windows: usize,
}

pub struct SeriesAssembler {
    fetcher: ChunkFetcher,
    pacer: Arc<dyn Pacer>,
}

impl SeriesAssembler {
    pub fn new(fetcher: ChunkFetcher, pacer: Arc<dyn Pacer>) -> Self {
        Self { fetcher, pacer }
    }

    /// Fetches every window of `range` for `symbol`, one at a time.
    ///
    /// The pacer runs after each request whether it succeeded or not. Windows
    /// are chronological and contiguous, so appending keeps date order; the
    /// writer still sorts before persisting.
    pub async fn assemble(
        &self,
        symbol: &str,
        range: &TimeRange,
        max_span_days: NonZeroU32,
    ) -> Assembly {
        let windows = plan_range(range, max_span_days);
        let mut series = BarSeries::new(symbol, TimeFrame::day());
        let mut empty_windows = 0;
        let mut failed_windows = 0;

        for (index, window) in windows.iter().enumerate() {
            tracing::debug!(
                symbol,
                window = index + 1,
                windows = windows.len(),
                start = %window.start(),
                end = %window.end(),
                "fetching window"
            );

            match self.fetcher.fetch(symbol, window).await {
                ChunkOutcome::Bars(bars) => series.append(bars),
                ChunkOutcome::Empty => empty_windows += 1,
                ChunkOutcome::Failed(_) => failed_windows += 1,
            }

            self.pacer.pace().await;
        }

        Assembly {
            series: (!series.is_empty()).then_some(series),
            windows: windows.len(),
            empty_windows,
            failed_windows,
        }
    }
}
