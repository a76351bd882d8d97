use chrono::SecondsFormat;
use serde::Deserialize;
use snafu::ensure;

use crate::{
    models::{request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::{ProviderError, ValidationSnafu},
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

impl Adjustment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
///
/// Free plans are limited to `iex`; `sip` needs a paid subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
        }
    }
}

/// Alpaca-specific parameters applied to every bars request.
///
/// Unset fields are left out of the query so Alpaca applies its own defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlpacaBarsParams {
    pub adjustment: Option<Adjustment>,
    pub feed: Option<Feed>,
}

/// Largest `limit` the bars endpoint accepts for a single page.
pub const MAX_PAGE_LIMIT: u32 = 10_000;

/// Rejects timeframes the Alpaca bars endpoint does not accept.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    timeframe.validate().map_err(|e| {
        ValidationSnafu {
            message: e.to_string(),
        }
        .build()
    })
}

/// Checks the universal request before it is turned into a query string.
pub fn validate_request(params: &BarsRequestParams) -> Result<(), ProviderError> {
    validate_timeframe(&params.timeframe)?;
    ensure!(
        !params.symbols.is_empty(),
        ValidationSnafu {
            message: "at least one symbol is required"
        }
    );
    ensure!(
        params.start < params.end,
        ValidationSnafu {
            message: format!("start {} must be before end {}", params.start, params.end)
        }
    );
    if let Some(limit) = params.limit {
        ensure!(
            (1..=MAX_PAGE_LIMIT).contains(&limit),
            ValidationSnafu {
                message: format!("limit {limit} is outside 1..={MAX_PAGE_LIMIT}")
            }
        );
    }
    Ok(())
}

/// Builds the query string pairs for `GET /v2/stocks/bars`.
pub fn construct_params(
    params: &BarsRequestParams,
    extra: &AlpacaBarsParams,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), params.timeframe.to_string()),
        (
            "start".to_string(),
            params.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "end".to_string(),
            params.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ];

    if let Some(limit) = params.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(adjustment) = extra.adjustment {
        query.push(("adjustment".to_string(), adjustment.as_str().to_string()));
    }
    if let Some(feed) = extra.feed {
        query.push(("feed".to_string(), feed.as_str().to_string()));
    }
    // windows are stitched in order, so rows must come back oldest first
    query.push(("sort".to_string(), "asc".to_string()));

    query
}
