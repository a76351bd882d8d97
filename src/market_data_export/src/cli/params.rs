use std::{num::NonZeroU32, path::Path};

use chrono::NaiveDate;

use crate::{
    errors::Error,
    io::symbols::{parse_symbols, read_symbols_file},
    requests::historical::plan_windows,
};

/// Resolves the symbol universe from `--symbols` or `--symbols-file`.
pub fn resolve_symbols(
    symbols: Option<&str>,
    symbols_file: Option<&Path>,
) -> Result<Vec<String>, Error> {
    let list = match (symbols, symbols_file) {
        (Some(inline), _) => parse_symbols(inline),
        (None, Some(path)) => read_symbols_file(path)?,
        (None, None) => Vec::new(),
    };
    if list.is_empty() {
        return Err(Error::Config("no symbols to export".into()));
    }
    Ok(list)
}

/// One line per planned window: `index  start  end  days`.
pub fn window_table(
    start: NaiveDate,
    end: NaiveDate,
    max_window_days: u32,
) -> Result<Vec<String>, Error> {
    let max = NonZeroU32::new(max_window_days)
        .ok_or_else(|| Error::Config("max_window_days must be greater than 0".into()))?;
    Ok(plan_windows(start, end, max)
        .iter()
        .enumerate()
        .map(|(i, w)| {
            format!(
                "{:>3}  {}  {}  {:>5}",
                i + 1,
                w.start(),
                w.end(),
                w.span_days() + 1
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inline_symbols_win_over_file() {
        let symbols = resolve_symbols(Some("aapl,msft"), Some(Path::new("/missing"))).unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn empty_universe_is_an_error() {
        assert!(matches!(
            resolve_symbols(Some(" , "), None),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            resolve_symbols(None, Some(Path::new("/definitely/missing.txt"))),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn table_lists_each_window() {
        let lines = window_table(date(2020, 7, 1), date(2025, 6, 30), 1000).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "  1  2020-07-01  2023-03-28   1001");
        assert!(lines[1].starts_with("  2  2023-03-29  2025-06-30"));

        assert!(window_table(date(2025, 1, 1), date(2025, 1, 1), 10).unwrap().is_empty());
        assert!(window_table(date(2025, 1, 1), date(2025, 2, 1), 0).is_err());
    }
}
