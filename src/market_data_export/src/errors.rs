use shared_utils::config::ConfigError;
use thiserror::Error;

use crate::providers::ProviderInitError;

/// The unified error type for the `market_data_export` crate.
///
/// Only startup and top-level failures surface as this type. Per-window and
/// per-symbol failures are absorbed by the pipeline and counted.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The config file could not be read or parsed.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// The data provider could not be constructed (e.g. missing credentials).
    #[error("Provider initialization failed: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
