//! Alpaca Market Data v2 historical stock bars.

pub mod params;
pub mod provider;
pub mod response;

pub use params::{Adjustment, AlpacaBarsParams, Feed};
pub use provider::{AlpacaCredentials, AlpacaOptions, AlpacaProvider};
