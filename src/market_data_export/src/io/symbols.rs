//! Ordered symbol lists from flags and text files.

use std::{fs, io, path::Path};

/// Splits `input` on commas and newlines.
///
/// Entries are trimmed and uppercased; blank entries and anything after a `#`
/// on a line are skipped. Order is kept and duplicates are not removed.
pub fn parse_symbols(input: &str) -> Vec<String> {
    input
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty())
        .map(str::to_uppercase)
        .collect()
}

pub fn read_symbols_file(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_symbols(&content))
}
