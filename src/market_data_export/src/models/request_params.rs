use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{time_range::TimeRange, timeframe::TimeFrame};

/// Universal parameters for requesting bar data from a market data provider.
///
/// This struct is vendor-agnostic; each
/// [`DataProvider`](crate::providers::DataProvider) maps it onto its own API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbols to request (e.g., `["AAPL"]`).
    pub symbols: Vec<String>,

    /// The interval of each bar. Providers validate which values they accept.
    #[serde(skip, default = "TimeFrame::day")]
    pub timeframe: TimeFrame,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    pub end: DateTime<Utc>,

    /// Upper bound on rows the provider may return for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BarsRequestParams {
    /// Daily bars for one symbol over one window, capped at `limit` rows.
    pub fn daily_window(symbol: &str, window: &TimeRange, limit: u32) -> Self {
        Self {
            symbols: vec![symbol.to_string()],
            timeframe: TimeFrame::day(),
            start: window.start_instant(),
            end: window.end_instant_exclusive(),
            limit: Some(limit),
        }
    }
}
