use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{
            params::{AlpacaBarsParams, construct_params, validate_request},
            response::AlpacaResponse,
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets";
const BARS_PATH: &str = "/v2/stocks/bars";

/// Environment variable holding the API key id.
pub const API_KEY_ENV: &str = "APCA_API_KEY_ID";
/// Environment variable holding the API secret.
pub const SECRET_KEY_ENV: &str = "APCA_API_SECRET_KEY";

/// The two secrets every Alpaca data request must carry.
pub struct AlpacaCredentials {
    pub api_key: SecretString,
    pub secret_key: SecretString,
}

impl AlpacaCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into().into()),
            secret_key: SecretString::new(secret_key.into().into()),
        }
    }

    /// Reads `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        let api_key = get_env_var(API_KEY_ENV).context(MissingEnvVarSnafu)?;
        let secret_key = get_env_var(SECRET_KEY_ENV).context(MissingEnvVarSnafu)?;
        Ok(Self::new(api_key, secret_key))
    }
}

/// Connection settings for [`AlpacaProvider`].
#[derive(Clone, Debug)]
pub struct AlpacaOptions {
    /// Scheme and host of the data API, without a trailing path.
    pub base_url: String,
    /// Transport-level timeout for one request.
    pub timeout: Duration,
    /// Parameters added to every request.
    pub defaults: AlpacaBarsParams,
}

impl Default for AlpacaOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            defaults: AlpacaBarsParams::default(),
        }
    }
}

pub struct AlpacaProvider {
    client: Client,
    bars_url: String,
    defaults: AlpacaBarsParams,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider with default options.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_options(AlpacaCredentials::from_env()?, AlpacaOptions::default())
    }

    /// Builds the long-lived HTTP client with the key headers baked in.
    pub fn with_options(
        credentials: AlpacaCredentials,
        options: AlpacaOptions,
    ) -> Result<Self, ProviderInitError> {
        let AlpacaCredentials {
            api_key,
            secret_key,
        } = credentials;

        let mut key_header = header::HeaderValue::from_str(api_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        key_header.set_sensitive(true);
        let mut secret_header = header::HeaderValue::from_str(secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret_header.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", key_header);
        headers.insert("APCA-API-SECRET-KEY", secret_header);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            bars_url: format!("{}{}", options.base_url.trim_end_matches('/'), BARS_PATH),
            defaults: options.defaults,
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        validate_request(&params)?;

        let query_params = construct_params(&params, &self.defaults);
        let response = self
            .client
            .get(&self.bars_url)
            .query(&query_params)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let alpaca_response = response
            .json::<AlpacaResponse>()
            .await
            .context(ReqwestSnafu)?;

        // One page per request: a token means the row limit cut the window short.
        if alpaca_response.next_page_token.is_some() {
            tracing::warn!(
                symbols = %params.symbols.join(","),
                start = %params.start,
                end = %params.end,
                limit = ?params.limit,
                "row limit reached, later bars in this window were not returned"
            );
        }

        Ok(alpaca_response.into_series(&params.timeframe))
    }
}
