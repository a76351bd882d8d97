use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (market_data_export.toml); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the lookback range of daily bars for every symbol and write one CSV per symbol
    #[command(group(ArgGroup::new("universe").required(true).args(["symbols", "symbols_file"])))]
    Export {
        /// Comma-separated list of symbols (e.g. "AAPL,MSFT")
        #[arg(long)]
        symbols: Option<String>,

        /// Text file with one symbol per line (commas and `#` comments allowed)
        #[arg(long)]
        symbols_file: Option<PathBuf>,

        /// Directory under which the run directory is created (overrides `output_root`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pin "today" to this date (YYYY-MM-DD) instead of the exchange clock
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Print the request windows for a date range without fetching anything
    Plan {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(short, long)]
        end: NaiveDate,

        /// Maximum days per window (overrides `max_window_days`)
        #[arg(long)]
        max_window_days: Option<u32>,
    },
}
