//! Reads exported CSV files back into [`BarSeries`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use snafu::{ResultExt, ensure};

use crate::{
    io::{
        csv_sink::{parse_export_dir_name, symbol_from_file_name},
        sink::{CsvSnafu, IoSnafu, MalformedSnafu, SinkError},
    },
    models::{bar::Bar, bar_series::BarSeries, timeframe::TimeFrame},
};

/// Parses one `{SYMBOL}_data.csv` file into a finalized series.
///
/// The symbol comes from the rows; a header-only file falls back to the file
/// name.
pub fn read_series(path: impl AsRef<Path>) -> Result<BarSeries, SinkError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvSnafu { path })?;

    let bars = reader
        .deserialize::<Bar>()
        .collect::<Result<Vec<_>, _>>()
        .context(CsvSnafu { path })?;

    let symbol = match bars.first() {
        Some(first) => first.symbol.clone(),
        None => path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(symbol_from_file_name)
            .map(str::to_string)
            .ok_or_else(|| {
                MalformedSnafu {
                    path,
                    message: "empty file with an unrecognized name",
                }
                .build()
            })?,
    };

    let mixed = bars.iter().find(|bar| bar.symbol != symbol);
    ensure!(
        mixed.is_none(),
        MalformedSnafu {
            path,
            message: format!("expected only {symbol} rows"),
        }
    );

    Ok(BarSeries::with_bars(symbol, TimeFrame::day(), bars).finalized())
}

/// Finds the export directory under `root` whose run range ends last.
///
/// Returns `None` when `root` is missing or holds no export directory.
pub fn latest_export_dir(root: impl AsRef<Path>) -> Result<Option<PathBuf>, SinkError> {
    let root = root.as_ref();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context(IoSnafu { path: root }),
    };

    let mut latest = None;
    for entry in entries {
        let entry = entry.context(IoSnafu { path: root })?;
        if !entry.file_type().context(IoSnafu { path: entry.path() })?.is_dir() {
            continue;
        }
        let Some(range) = entry.file_name().to_str().and_then(parse_export_dir_name) else {
            continue;
        };
        if latest
            .as_ref()
            .is_none_or(|(best, _)| (range.end(), range.start()) > *best)
        {
            latest = Some(((range.end(), range.start()), entry.path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}
