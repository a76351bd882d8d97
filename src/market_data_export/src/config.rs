//! Run configuration.
//!
//! Every field of the TOML file is optional. Defaults: five years of daily
//! bars, 50-symbol batches, one second between requests.

use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::{Path, PathBuf},
    time::Duration,
};

use chrono_tz::Tz;
use nonzero_ext::nonzero;
use serde::Deserialize;
use shared_utils::config::load_toml;

use crate::{
    errors::Error,
    providers::alpaca_rest::{
        AlpacaOptions,
        params::{Adjustment, AlpacaBarsParams, Feed, MAX_PAGE_LIMIT},
        provider::DEFAULT_BASE_URL,
    },
    requests::historical::window::max_weekdays_in_window,
};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub lookback_days: u32,
    pub batch_size: usize,
    pub max_window_days: u32,
    pub row_limit: u32,
    pub request_timeout_secs: u64,
    /// IANA zone that decides what "today" is.
    pub timezone: String,
    /// Directory under which each run creates its export directory.
    pub output_root: PathBuf,
    pub pacing: PacingConfig,
    pub alpaca: AlpacaConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            lookback_days: 5 * 365,
            batch_size: 50,
            max_window_days: 1000,
            row_limit: 1000,
            request_timeout_secs: 30,
            timezone: "America/New_York".to_string(),
            output_root: PathBuf::from("."),
            pacing: PacingConfig::default(),
            alpaca: AlpacaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PacingConfig {
    pub chunk_delay_ms: u64,
    pub symbol_delay_ms: u64,
    /// When set, chunk pacing uses a quota limiter instead of the fixed delay.
    pub requests_per_minute: Option<u32>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            chunk_delay_ms: 1000,
            symbol_delay_ms: 1000,
            requests_per_minute: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlpacaConfig {
    pub base_url: String,
    pub feed: Option<Feed>,
    pub adjustment: Option<Adjustment>,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            feed: None,
            adjustment: None,
        }
    }
}

/// Validated, immutable settings shared by every stage of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub lookback_days: u32,
    pub batch_size: NonZeroUsize,
    pub max_window_days: NonZeroU32,
    pub row_limit: u32,
    pub request_timeout: Duration,
    pub chunk_delay: Duration,
    pub symbol_delay: Duration,
    pub requests_per_minute: Option<NonZeroU32>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            lookback_days: 5 * 365,
            batch_size: nonzero!(50usize),
            max_window_days: nonzero!(1000u32),
            row_limit: 1000,
            request_timeout: Duration::from_secs(30),
            chunk_delay: Duration::from_secs(1),
            symbol_delay: Duration::from_secs(1),
            requests_per_minute: None,
        }
    }
}

impl ExportConfig {
    /// Loads the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config: Self = load_toml(path)?;
        tracing::debug!(?config, "loaded export config");
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validates the numeric settings and freezes them into a [`RunContext`].
    pub fn run_context(&self) -> Result<RunContext, Error> {
        if self.lookback_days == 0 {
            return Err(Error::Config("lookback_days must be greater than 0".into()));
        }
        let batch_size = NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| Error::Config("batch_size must be greater than 0".into()))?;
        let max_window_days = NonZeroU32::new(self.max_window_days)
            .ok_or_else(|| Error::Config("max_window_days must be greater than 0".into()))?;
        if self.row_limit == 0 || self.row_limit > MAX_PAGE_LIMIT {
            return Err(Error::Config(format!(
                "row_limit must be between 1 and {MAX_PAGE_LIMIT}, got {}",
                self.row_limit
            )));
        }
        let window_rows = max_weekdays_in_window(max_window_days);
        if window_rows > u64::from(self.row_limit) {
            return Err(Error::Config(format!(
                "max_window_days {} can hold up to {window_rows} daily bars, more than row_limit {}",
                self.max_window_days, self.row_limit
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        let requests_per_minute = match self.pacing.requests_per_minute {
            Some(rpm) => Some(NonZeroU32::new(rpm).ok_or_else(|| {
                Error::Config("pacing.requests_per_minute must be greater than 0".into())
            })?),
            None => None,
        };

        Ok(RunContext {
            lookback_days: self.lookback_days,
            batch_size,
            max_window_days,
            row_limit: self.row_limit,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            chunk_delay: Duration::from_millis(self.pacing.chunk_delay_ms),
            symbol_delay: Duration::from_millis(self.pacing.symbol_delay_ms),
            requests_per_minute,
        })
    }

    pub fn timezone(&self) -> Result<Tz, Error> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| Error::Config(format!("invalid timezone {:?}: {e}", self.timezone)))
    }

    /// Connection settings for the Alpaca provider.
    pub fn alpaca_options(&self) -> AlpacaOptions {
        AlpacaOptions {
            base_url: self.alpaca.base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            defaults: AlpacaBarsParams {
                adjustment: self.alpaca.adjustment,
                feed: self.alpaca.feed,
                ..Default::default()
            },
        }
    }
}
