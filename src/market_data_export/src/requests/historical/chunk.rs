//! One bounded provider request per `(symbol, window)`, fail-soft.

use std::{sync::Arc, time::Duration};

use snafu::Snafu;

use crate::{
    models::{bar::Bar, request_params::BarsRequestParams, time_range::TimeRange},
    providers::{DataProvider, ProviderError},
};

/// Why a window produced no rows because something went wrong.
#[derive(Debug, Snafu)]
pub enum ChunkFailure {
    #[snafu(display("provider request failed: {source}"))]
    Provider { source: ProviderError },

    #[snafu(display("request did not complete within {after:?}"))]
    Timeout { after: Duration },
}

/// Result of fetching one window. Never escapes as an error.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The window returned rows for the symbol.
    Bars(Vec<Bar>),
    /// The request succeeded but the window holds no trading days.
    Empty,
    /// The request failed; the window is treated as having no data.
    Failed(ChunkFailure),
}

/// Issues exactly one request per call against a shared provider handle.
#[derive(Clone)]
pub struct ChunkFetcher {
    provider: Arc<dyn DataProvider + Send + Sync>,
    row_limit: u32,
    timeout: Duration,
}

impl ChunkFetcher {
    pub fn new(provider: Arc<dyn DataProvider + Send + Sync>, row_limit: u32, timeout: Duration) -> Self {
        Self {
            provider,
            row_limit,
            timeout,
        }
    }

    /// Fetches daily bars for `symbol` inside `window`.
    ///
    /// The caller sizes `window` so its trading days fit under the row limit.
    /// Rows for other symbols, or dated outside the window, are discarded.
    pub async fn fetch(&self, symbol: &str, window: &TimeRange) -> ChunkOutcome {
        let params = BarsRequestParams::daily_window(symbol, window, self.row_limit);

        let response = match tokio::time::timeout(self.timeout, self.provider.fetch_bars(params)).await
        {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(
                    symbol,
                    window_start = %window.start(),
                    window_end = %window.end(),
                    timeout = ?self.timeout,
                    "chunk request timed out"
                );
                return ChunkOutcome::Failed(ChunkFailure::Timeout {
                    after: self.timeout,
                });
            }
        };

        let series = match response {
            Ok(series) => series,
            Err(source) => {
                tracing::warn!(
                    symbol,
                    window_start = %window.start(),
                    window_end = %window.end(),
                    error = %source,
                    auth = source.is_auth(),
                    "Error fetching data chunk"
                );
                return ChunkOutcome::Failed(ChunkFailure::Provider { source });
            }
        };

        let mut discarded = 0usize;
        let bars: Vec<Bar> = series
            .into_iter()
            .filter(|s| s.symbol.eq_ignore_ascii_case(symbol))
            .flat_map(|s| s.bars)
            .filter(|bar| {
                let inside = window.contains(bar.date);
                if !inside {
                    discarded += 1;
                }
                inside
            })
            .collect();

        if discarded > 0 {
            tracing::debug!(symbol, discarded, window = %window, "dropped rows outside the window");
        }

        if bars.is_empty() {
            tracing::debug!(symbol, window = %window, "no data in window");
            ChunkOutcome::Empty
        } else {
            ChunkOutcome::Bars(bars)
        }
    }
}
