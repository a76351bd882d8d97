//! Daily-bar export pipeline: plans request windows over a lookback range,
//! fetches them from a rate-limited provider, stitches one series per symbol
//! and writes one CSV file per symbol per run.

pub mod calendar;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
pub mod requests;

pub use errors::Error;
