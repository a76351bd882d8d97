use std::{
    collections::HashMap,
    fs, io,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use market_data_export::{
    calendar::FixedClock,
    config::RunContext,
    io::{
        csv_sink::CsvSink,
        csv_source::{latest_export_dir, read_series},
    },
    models::{bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::{ApiSnafu, DataProvider, ProviderError},
    requests::historical::{BatchScheduler, RunSummary},
};
use nonzero_ext::nonzero;
use tracing_subscriber::fmt::MakeWriter;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2025, 6, 30)
}

fn bar(symbol: &str, d: NaiveDate, close: f64) -> Bar {
    Bar {
        date: d,
        symbol: symbol.to_string(),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 10_000,
    }
}

enum Script {
    Bars(Vec<Bar>),
    Fail,
}

/// Answers by `(symbol, window start)`; anything unscripted is an empty window.
#[derive(Default)]
struct ScriptedProvider {
    scripts: HashMap<(String, NaiveDate), Script>,
    calls: Mutex<Vec<(String, NaiveDate)>>,
}

impl ScriptedProvider {
    fn script(mut self, symbol: &str, window_start: NaiveDate, script: Script) -> Self {
        self.scripts.insert((symbol.to_string(), window_start), script);
        self
    }

    fn calls(&self) -> Vec<(String, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let symbol = params.symbols[0].clone();
        let start = params.start.date_naive();
        self.calls.lock().unwrap().push((symbol.clone(), start));

        match self.scripts.get(&(symbol.clone(), start)) {
            Some(Script::Bars(bars)) => Ok(vec![BarSeries::with_bars(
                symbol,
                TimeFrame::day(),
                bars.clone(),
            )]),
            Some(Script::Fail) => ApiSnafu {
                status: 503u16,
                message: "service unavailable",
            }
            .fail(),
            None => Ok(Vec::new()),
        }
    }
}

/// Collects formatted log output for the current thread.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn context(lookback_days: u32, max_window_days: u32) -> RunContext {
    RunContext {
        lookback_days,
        max_window_days: std::num::NonZeroU32::new(max_window_days).unwrap(),
        chunk_delay: Duration::ZERO,
        symbol_delay: Duration::ZERO,
        ..RunContext::default()
    }
}

async fn run(
    ctx: RunContext,
    provider: Arc<ScriptedProvider>,
    root: &Path,
    symbols: &[&str],
) -> RunSummary {
    let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
    let scheduler = BatchScheduler::from_context(
        ctx,
        provider,
        Arc::new(CsvSink::new(root)),
        Arc::new(FixedClock(today())),
    );
    scheduler.run(&symbols).await
}

#[tokio::test]
async fn single_window_rows_are_written_sorted() {
    let root = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::default().script(
        "TEST",
        date(2025, 6, 20),
        Script::Bars(vec![
            bar("TEST", date(2025, 6, 25), 3.0),
            bar("TEST", date(2025, 6, 23), 1.0),
            bar("TEST", date(2025, 6, 24), 2.0),
        ]),
    ));

    let summary = run(context(10, 1000), provider.clone(), root.path(), &["TEST"]).await;

    assert_eq!(provider.calls().len(), 1);
    assert_eq!(summary.windows, 1);
    assert_eq!(summary.written.len(), 1);

    let path = &summary.written[0];
    assert_eq!(
        path,
        &root
            .path()
            .join("market_data_export_2025-06-20_to_2025-06-30")
            .join("TEST_data.csv")
    );
    let content = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Date,Symbol,Open,High,Low,Close,Volume",
            "2025-06-23,TEST,1.0,1.5,0.5,1.0,10000",
            "2025-06-24,TEST,2.0,2.5,1.5,2.0,10000",
            "2025-06-25,TEST,3.0,3.5,2.5,3.0,10000",
        ]
    );
}

#[tokio::test]
async fn failed_first_window_keeps_second() {
    let root = tempfile::tempdir().unwrap();
    let provider = Arc::new(
        ScriptedProvider::default()
            .script("TEST", date(2025, 6, 10), Script::Fail)
            .script(
                "TEST",
                date(2025, 6, 21),
                Script::Bars(vec![
                    bar("TEST", date(2025, 6, 23), 1.0),
                    bar("TEST", date(2025, 6, 24), 2.0),
                ]),
            ),
    );

    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let summary = run(context(20, 10), provider.clone(), root.path(), &["TEST"]).await;

    let output = logs.contents();
    let failure = output
        .lines()
        .find(|line| line.contains("Error fetching data chunk"))
        .expect("window failure was not logged");
    assert!(failure.contains("WARN"));
    assert!(failure.contains("TEST"));
    assert!(failure.contains("window_start=2025-06-10"));
    assert!(failure.contains("window_end=2025-06-20"));
    assert!(failure.contains("503"));
    assert!(!output.contains("window_start=2025-06-21"));

    assert_eq!(
        provider.calls(),
        vec![
            ("TEST".to_string(), date(2025, 6, 10)),
            ("TEST".to_string(), date(2025, 6, 21)),
        ]
    );
    assert_eq!(summary.windows, 2);
    assert_eq!(summary.failed_windows, 1);

    let series = read_series(&summary.written[0]).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.first_date(), Some(date(2025, 6, 23)));
}

#[tokio::test]
async fn symbol_without_data_writes_nothing_and_run_continues() {
    let root = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::default().script(
        "AAPL",
        date(2025, 6, 20),
        Script::Bars(vec![bar("AAPL", date(2025, 6, 27), 200.0)]),
    ));

    let summary = run(context(10, 1000), provider, root.path(), &["GHOST", "AAPL"]).await;

    assert_eq!(summary.absent, vec!["GHOST".to_string()]);
    assert_eq!(summary.written.len(), 1);

    let dir = root.path().join("market_data_export_2025-06-20_to_2025-06-30");
    assert!(!dir.join("GHOST_data.csv").exists());
    assert!(dir.join("AAPL_data.csv").exists());
}

#[tokio::test]
async fn universe_is_split_into_batches_in_order() {
    let root = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::default());
    let symbols: Vec<String> = (0..120).map(|i| format!("S{i:03}")).collect();
    let symbol_refs: Vec<&str> = symbols.iter().map(String::as_str).collect();

    let ctx = RunContext {
        batch_size: nonzero!(50usize),
        ..context(10, 1000)
    };
    let summary = run(ctx, provider.clone(), root.path(), &symbol_refs).await;

    assert_eq!(summary.batches, vec![50, 50, 20]);
    assert_eq!(summary.symbols, 120);
    assert_eq!(summary.absent.len(), 120);

    let called: Vec<String> = provider.calls().into_iter().map(|(s, _)| s).collect();
    assert_eq!(called, symbols);
}

#[tokio::test]
async fn written_files_read_back_from_latest_run() {
    let root = tempfile::tempdir().unwrap();
    let bars = vec![
        bar("MSFT", date(2025, 6, 26), 450.25),
        bar("MSFT", date(2025, 6, 27), 451.5),
    ];
    let provider = Arc::new(ScriptedProvider::default().script(
        "MSFT",
        date(2025, 6, 20),
        Script::Bars(bars.clone()),
    ));
    fs::create_dir(root.path().join("market_data_export_2019-01-01_to_2024-01-01")).unwrap();

    let summary = run(context(10, 1000), provider, root.path(), &["MSFT"]).await;

    let latest = latest_export_dir(root.path()).unwrap().unwrap();
    assert_eq!(Some(latest.as_path()), summary.written[0].parent());

    let series = read_series(latest.join("MSFT_data.csv")).unwrap();
    assert_eq!(series, BarSeries::with_bars("MSFT", TimeFrame::day(), bars));
}

#[tokio::test]
async fn rerun_overwrites_with_identical_bytes() {
    let root = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::default().script(
        "TEST",
        date(2025, 6, 20),
        Script::Bars(vec![
            bar("TEST", date(2025, 6, 24), 2.0),
            bar("TEST", date(2025, 6, 23), 1.0),
        ]),
    ));

    let first = run(context(10, 1000), provider.clone(), root.path(), &["TEST"]).await;
    let before = fs::read(&first.written[0]).unwrap();
    let second = run(context(10, 1000), provider, root.path(), &["TEST"]).await;
    let after = fs::read(&second.written[0]).unwrap();

    assert_eq!(first.written, second.written);
    assert_eq!(before, after);
}
