use std::sync::Arc;

use clap::Parser;
use market_data_export::{
    calendar::{ExchangeClock, FixedClock, MarketClock},
    cli::{
        Cli, Commands,
        params::{resolve_symbols, window_table},
    },
    config::ExportConfig,
    io::csv_sink::CsvSink,
    providers::{
        DataProvider,
        alpaca_rest::{AlpacaCredentials, AlpacaProvider},
    },
    requests::historical::BatchScheduler,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExportConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan {
            start,
            end,
            max_window_days,
        } => {
            let max = max_window_days.unwrap_or(config.max_window_days);
            for line in window_table(start, end, max)? {
                println!("{line}");
            }
        }

        Commands::Export {
            symbols,
            symbols_file,
            output,
            as_of,
        } => {
            let ctx = config.run_context()?;
            let symbols = resolve_symbols(symbols.as_deref(), symbols_file.as_deref())?;

            let clock: Arc<dyn MarketClock> = match as_of {
                Some(date) => Arc::new(FixedClock(date)),
                None => Arc::new(ExchangeClock::new(config.timezone()?)),
            };

            // Fails fast on missing credentials before any request is made.
            let provider: Arc<dyn DataProvider + Send + Sync> = Arc::new(
                AlpacaProvider::with_options(AlpacaCredentials::from_env()?, config.alpaca_options())?,
            );

            let sink = Arc::new(CsvSink::new(output.unwrap_or(config.output_root.clone())));
            tracing::info!(
                symbols = symbols.len(),
                batch_size = ctx.batch_size.get(),
                lookback_days = ctx.lookback_days,
                output_root = %sink.output_root().display(),
                "Starting data export"
            );

            let scheduler = BatchScheduler::from_context(ctx, provider, sink, clock);
            let summary = scheduler.run(&symbols).await;
            summary.log_summary();
        }
    }

    Ok(())
}
