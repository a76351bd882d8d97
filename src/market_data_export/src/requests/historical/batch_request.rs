//! Drives the whole universe through the per-symbol pipeline in batches.

use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::time::Instant;

use crate::{
    calendar::MarketClock,
    config::RunContext,
    io::sink::DataSink,
    models::time_range::TimeRange,
    providers::DataProvider,
    requests::historical::{
        chunk::ChunkFetcher,
        pacing::{Pacer, chunk_pacer, symbol_pacer},
        single_request::SeriesAssembler,
    },
};

/// Tallies for one export run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Size of each batch, in processing order.
    pub batches: Vec<usize>,
    /// Symbols attempted.
    pub symbols: usize,
    /// Files written, in symbol order.
    pub written: Vec<PathBuf>,
    /// Symbols for which no window returned data.
    pub absent: Vec<String>,
    /// Symbols whose series could not be persisted.
    pub write_failures: Vec<String>,
    pub windows: usize,
    pub empty_windows: usize,
    pub failed_windows: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log_summary(&self) {
        tracing::info!(
            batches = self.batches.len(),
            symbols = self.symbols,
            written = self.written.len(),
            absent = self.absent.len(),
            write_failures = self.write_failures.len(),
            windows = self.windows,
            empty_windows = self.empty_windows,
            failed_windows = self.failed_windows,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "Data export completed"
        );
    }
}

pub type PathSink = Arc<dyn DataSink<Output = PathBuf> + Send + Sync>;

pub struct BatchScheduler {
    ctx: RunContext,
    assembler: SeriesAssembler,
    sink: PathSink,
    clock: Arc<dyn MarketClock>,
    symbol_pacer: Arc<dyn Pacer>,
}

impl BatchScheduler {
    pub fn new(
        ctx: RunContext,
        assembler: SeriesAssembler,
        sink: PathSink,
        clock: Arc<dyn MarketClock>,
        symbol_pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            ctx,
            assembler,
            sink,
            clock,
            symbol_pacer,
        }
    }

    /// Wires fetcher, assembler and pacers from the run context.
    pub fn from_context(
        ctx: RunContext,
        provider: Arc<dyn DataProvider + Send + Sync>,
        sink: PathSink,
        clock: Arc<dyn MarketClock>,
    ) -> Self {
        let fetcher = ChunkFetcher::new(provider, ctx.row_limit, ctx.request_timeout);
        let assembler = SeriesAssembler::new(fetcher, chunk_pacer(&ctx));
        let symbol_pacer = symbol_pacer(&ctx);
        Self::new(ctx, assembler, sink, clock, symbol_pacer)
    }

    /// Processes `symbols` in list order, `batch_size` at a time.
    ///
    /// Batches only group progress logging. Every failure below the run level
    /// is logged and counted; the run always reaches the end of the list.
    pub async fn run(&self, symbols: &[String]) -> RunSummary {
        let started = Instant::now();
        let batch_size = self.ctx.batch_size.get();
        let total_batches = symbols.len().div_ceil(batch_size);
        let mut summary = RunSummary {
            symbols: symbols.len(),
            ..Default::default()
        };

        for (index, batch) in symbols.chunks(batch_size).enumerate() {
            tracing::info!(
                batch = index + 1,
                total_batches,
                size = batch.len(),
                "Processing batch {} of {}",
                index + 1,
                total_batches
            );
            summary.batches.push(batch.len());

            for symbol in batch {
                self.process_symbol(symbol, &mut summary).await;
                self.symbol_pacer.pace().await;
            }
        }

        summary.elapsed = started.elapsed();
        summary
    }

    async fn process_symbol(&self, symbol: &str, summary: &mut RunSummary) {
        // evaluated per symbol so a long run keeps advancing "today"
        let range = TimeRange::lookback(self.clock.today(), self.ctx.lookback_days);

        let assembly = self
            .assembler
            .assemble(symbol, &range, self.ctx.max_window_days)
            .await;
        summary.windows += assembly.windows;
        summary.empty_windows += assembly.empty_windows;
        summary.failed_windows += assembly.failed_windows;

        let Some(series) = assembly.series else {
            tracing::warn!(
                symbol,
                range = %range,
                failed_windows = assembly.failed_windows,
                "no data for symbol, skipping"
            );
            summary.absent.push(symbol.to_string());
            return;
        };

        match self.sink.write(&series, &range).await {
            Ok(path) => {
                tracing::info!(
                    symbol,
                    rows = series.len(),
                    first = ?series.first_date(),
                    last = ?series.last_date(),
                    path = %path.display(),
                    "Saved data for {}",
                    symbol
                );
                summary.written.push(path);
            }
            Err(e) => {
                tracing::error!(symbol, error = %e, "failed to write series");
                summary.write_failures.push(symbol.to_string());
            }
        }
    }
}
