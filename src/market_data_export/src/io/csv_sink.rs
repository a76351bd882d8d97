//! Per-symbol CSV files grouped in one directory per run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use snafu::{ResultExt, ensure};

use crate::{
    io::sink::{CsvSnafu, DataSink, InvalidSymbolSnafu, IoSnafu, SinkError},
    models::{bar_series::BarSeries, time_range::TimeRange},
};

/// Column order of every exported file.
pub const COLUMNS: [&str; 7] = ["Date", "Symbol", "Open", "High", "Low", "Close", "Volume"];

const DIR_PREFIX: &str = "market_data_export_";
const FILE_SUFFIX: &str = "_data.csv";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// `market_data_export_{start}_to_{end}`.
pub fn export_dir_name(run_range: &TimeRange) -> String {
    format!(
        "{DIR_PREFIX}{}_to_{}",
        run_range.start().format(DATE_FORMAT),
        run_range.end().format(DATE_FORMAT)
    )
}

/// Inverse of [`export_dir_name`].
pub fn parse_export_dir_name(name: &str) -> Option<TimeRange> {
    let (start, end) = name.strip_prefix(DIR_PREFIX)?.split_once("_to_")?;
    let start = NaiveDate::parse_from_str(start, DATE_FORMAT).ok()?;
    let end = NaiveDate::parse_from_str(end, DATE_FORMAT).ok()?;
    TimeRange::new(start, end)
}

/// `{SYMBOL}_data.csv`.
pub fn file_name(symbol: &str) -> String {
    format!("{symbol}{FILE_SUFFIX}")
}

/// Recovers the symbol from a file name written by [`CsvSink`].
pub fn symbol_from_file_name(name: &str) -> Option<&str> {
    name.strip_suffix(FILE_SUFFIX).filter(|s| !s.is_empty())
}

fn check_symbol(symbol: &str) -> Result<(), SinkError> {
    let usable = !symbol.is_empty()
        && !symbol.chars().all(|c| c == '.')
        && !symbol.contains(['/', '\\'])
        && !symbol.chars().any(char::is_control);
    ensure!(usable, InvalidSymbolSnafu { symbol });
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CsvSink {
    output_root: PathBuf,
}

impl CsvSink {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Directory holding every file of the run covering `run_range`.
    pub fn export_dir(&self, run_range: &TimeRange) -> PathBuf {
        self.output_root.join(export_dir_name(run_range))
    }

    /// Writes `series` to `path`, replacing any previous content.
    pub fn write_file(series: &BarSeries, path: &Path) -> Result<(), SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .context(CsvSnafu { path })?;

        writer.write_record(COLUMNS).context(CsvSnafu { path })?;
        for bar in &series.bars {
            writer.serialize(bar).context(CsvSnafu { path })?;
        }
        writer.flush().context(IoSnafu { path })?;
        Ok(())
    }
}

#[async_trait]
impl DataSink for CsvSink {
    type Output = PathBuf;

    async fn write(
        &self,
        series: &BarSeries,
        run_range: &TimeRange,
    ) -> Result<PathBuf, SinkError> {
        check_symbol(&series.symbol)?;

        let dir = self.export_dir(run_range);
        let path = dir.join(file_name(&series.symbol));
        let sorted = series.clone().finalized();
        let rows = sorted.len();

        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            fs::create_dir_all(&dir).context(IoSnafu { path: &dir })?;
            Self::write_file(&sorted, &target)
        })
        .await
        .map_err(std::io::Error::other)
        .context(IoSnafu { path: &path })??;

        tracing::debug!(
            symbol = %series.symbol,
            rows,
            path = %path.display(),
            "wrote csv"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{bar::Bar, timeframe::TimeFrame};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(symbol: &str, d: NaiveDate, close: f64) -> Bar {
        Bar {
            date: d,
            symbol: symbol.to_string(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000,
        }
    }

    fn run_range() -> TimeRange {
        TimeRange::new(date(2020, 7, 1), date(2025, 6, 30)).unwrap()
    }

    #[test]
    fn dir_name_round_trips() {
        let name = export_dir_name(&run_range());
        assert_eq!(name, "market_data_export_2020-07-01_to_2025-06-30");
        assert_eq!(parse_export_dir_name(&name), Some(run_range()));
        assert_eq!(parse_export_dir_name("market_data_export_2020-07-01"), None);
        assert_eq!(parse_export_dir_name("other_2020-07-01_to_2025-06-30"), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name("AAPL"), "AAPL_data.csv");
        assert_eq!(symbol_from_file_name("BRK.B_data.csv"), Some("BRK.B"));
        assert_eq!(symbol_from_file_name("_data.csv"), None);
        assert_eq!(symbol_from_file_name("notes.txt"), None);
    }

    #[tokio::test]
    async fn writes_sorted_rows_under_header() {
        let root = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(root.path());
        let series = BarSeries::with_bars(
            "TEST",
            TimeFrame::day(),
            vec![
                bar("TEST", date(2024, 1, 4), 12.5),
                bar("TEST", date(2024, 1, 2), 10.0),
                bar("TEST", date(2024, 1, 3), 11.0),
            ],
        );

        let path = sink.write(&series, &run_range()).await.unwrap();
        assert_eq!(
            path,
            root.path()
                .join("market_data_export_2020-07-01_to_2025-06-30")
                .join("TEST_data.csv")
        );

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Symbol,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "2024-01-02,TEST,9.0,11.0,8.0,10.0,1000");
        assert_eq!(lines[3], "2024-01-04,TEST,11.5,13.5,10.5,12.5,1000");
        assert_eq!(lines.len(), 4);
    }

    #[tokio::test]
    async fn rewrite_is_byte_identical() {
        let root = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(root.path());
        let series = BarSeries::with_bars(
            "TEST",
            TimeFrame::day(),
            vec![
                bar("TEST", date(2024, 1, 3), 11.0),
                bar("TEST", date(2024, 1, 2), 10.0),
                bar("TEST", date(2024, 1, 3), 11.0),
            ],
        );

        let path = sink.write(&series, &run_range()).await.unwrap();
        let first = fs::read(&path).unwrap();
        sink.write(&series, &run_range()).await.unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap().lines().count(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_writes_share_one_run_directory() {
        let root = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(CsvSink::new(root.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move {
                    let symbol = format!("SYM{i}");
                    let series = BarSeries::with_bars(
                        symbol.as_str(),
                        TimeFrame::day(),
                        vec![bar(&symbol, date(2024, 1, 2), f64::from(i))],
                    );
                    sink.write(&series, &run_range()).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let dir = sink.export_dir(&run_range());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 8);
        let series = fs::read_to_string(dir.join("SYM3_data.csv")).unwrap();
        assert!(series.trim_end().ends_with("2024-01-02,SYM3,2.0,4.0,1.0,3.0,1000"));
    }

    #[tokio::test]
    async fn rejects_path_like_symbols() {
        let root = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(root.path());
        for symbol in ["", "..", "A/B", "A\\B"] {
            let series = BarSeries::with_bars(
                symbol,
                TimeFrame::day(),
                vec![bar(symbol, date(2024, 1, 2), 1.0)],
            );
            let err = sink.write(&series, &run_range()).await.unwrap_err();
            assert!(matches!(err, SinkError::InvalidSymbol { .. }), "{symbol:?}");
        }
    }
}
