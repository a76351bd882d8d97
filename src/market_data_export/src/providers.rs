//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single call contract the
//! export pipeline has with a market data vendor. [`alpaca_rest`] implements it
//! for Alpaca's historical bars endpoint; tests substitute scripted fakes.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`Arc<dyn DataProvider + Send + Sync>`), so one long-lived handle can be built
//! at startup and injected everywhere it is needed.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_export::models::{
//!     bar_series::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_export::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod alpaca_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar_series::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching bar data from a market data provider.
#[async_trait]
pub trait DataProvider {
    /// Fetches bar data for the given request parameters.
    ///
    /// Issues exactly one request; implementations must not page or retry on
    /// their own, the caller sizes the request so one page is enough.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - One series per symbol that had data. Symbols
    ///   without rows may be missing or present with no bars.
    /// * `Err(ProviderError)` - Transport, status, validation or decode failure.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout, undecodable body).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with a non-success status (e.g., invalid API key).
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },
}

impl ProviderError {
    /// True for HTTP 401/403 answers, i.e. the credentials were refused.
    pub fn is_auth(&self) -> bool {
        matches!(self, ProviderError::Api { status: 401 | 403, .. })
    }
}
