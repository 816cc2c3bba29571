// src/core/rows.rs

use crate::constants::TEMP_ROWS_PREFIX;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref SINGLE_ROW_RE: Regex = Regex::new(r"^\d+$").unwrap();
    static ref ROW_RANGE_RE: Regex = Regex::new(r"^(\d+)-(\d+)$").unwrap();
    static ref ROW_LIST_RE: Regex = Regex::new(r"^[\d,\s]+$").unwrap();
}

#[derive(Error, Debug)]
pub enum RowSelectionError {
    #[error("Row selection is empty.")]
    Empty,
    #[error("Invalid row selection format: '{0}'. Use 2, 2-5 or 1,3,5.")]
    InvalidFormat(String),
    #[error("Invalid row number '{0}'. Rows are numbered from 1.")]
    InvalidRow(String),
    #[error("Invalid row range '{0}': start is greater than end.")]
    ReversedRange(String),
    #[error("Could not read CSV file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write filtered CSV file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rows {
    Range(RangeInclusive<usize>),
    List(BTreeSet<usize>),
}

/// A parsed, 1-indexed set of CSV data rows. The header is never part of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSelection {
    raw: String,
    rows: Rows,
}

fn parse_row(value: &str) -> Result<usize, RowSelectionError> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(RowSelectionError::InvalidRow(value.trim().to_string())),
        Ok(n) => Ok(n),
    }
}

impl RowSelection {
    /// Parses `N`, `N-M` (inclusive, `N <= M`) or `N,M,...`.
    pub fn parse(raw: &str) -> Result<Self, RowSelectionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RowSelectionError::Empty);
        }

        let rows = if SINGLE_ROW_RE.is_match(trimmed) {
            let row = parse_row(trimmed)?;
            Rows::Range(row..=row)
        } else if let Some(caps) = ROW_RANGE_RE.captures(trimmed) {
            let start = parse_row(caps.get(1).map_or("", |m| m.as_str()))?;
            let end = parse_row(caps.get(2).map_or("", |m| m.as_str()))?;
            if start > end {
                return Err(RowSelectionError::ReversedRange(trimmed.to_string()));
            }
            Rows::Range(start..=end)
        } else if ROW_LIST_RE.is_match(trimmed) {
            let list: BTreeSet<usize> = trimmed
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(parse_row)
                .collect::<Result<_, _>>()?;
            if list.is_empty() {
                return Err(RowSelectionError::InvalidFormat(trimmed.to_string()));
            }
            Rows::List(list)
        } else {
            return Err(RowSelectionError::InvalidFormat(trimmed.to_string()));
        };

        Ok(Self {
            raw: trimmed.to_string(),
            rows,
        })
    }

    pub fn contains(&self, row: usize) -> bool {
        match &self.rows {
            Rows::Range(range) => range.contains(&row),
            Rows::List(list) => list.contains(&row),
        }
    }

    /// The selector as the user typed it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// File name for the filtered CSV, derived from the selection so separate
    /// invocations with different selections do not collide.
    pub fn file_name(&self) -> String {
        let tag: String = self
            .raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '_' } else { c })
            .collect();
        format!("{}{}.csv", TEMP_ROWS_PREFIX, tag)
    }
}

/// Writes a copy of `csv_file` into `out_dir` that keeps the header line and only
/// the selected data rows. Returns the path of the new file.
pub fn filter_rows(
    csv_file: &Path,
    selection: &RowSelection,
    out_dir: &Path,
) -> Result<PathBuf, RowSelectionError> {
    let read_err = |source| RowSelectionError::Read {
        path: csv_file.display().to_string(),
        source,
    };
    let output_path = out_dir.join(selection.file_name());
    let write_err = |source| RowSelectionError::Write {
        path: output_path.display().to_string(),
        source,
    };

    let input = File::open(csv_file).map_err(read_err)?;
    fs::create_dir_all(out_dir).map_err(write_err)?;
    let mut writer = BufWriter::new(File::create(&output_path).map_err(write_err)?);

    for (index, line) in BufReader::new(input).lines().enumerate() {
        let line = line.map_err(read_err)?;
        // Line 0 is the header; data row numbering starts at 1 on the next line.
        if index == 0 || selection.contains(index) {
            writeln!(writer, "{}", line).map_err(write_err)?;
        }
    }
    writer.flush().map_err(write_err)?;

    log::debug!(
        "Filtered '{}' with rows '{}' into '{}'",
        csv_file.display(),
        selection.raw,
        output_path.display()
    );
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_single_range_and_list() {
        let single = RowSelection::parse("2").unwrap();
        assert!(single.contains(2));
        assert!(!single.contains(1));

        let range = RowSelection::parse("2-4").unwrap();
        assert!((2..=4).all(|r| range.contains(r)));
        assert!(!range.contains(5));

        let list = RowSelection::parse("1,3, 5").unwrap();
        assert!(list.contains(1) && list.contains(3) && list.contains(5));
        assert!(!list.contains(2));
    }

    #[test]
    fn test_huge_range_is_not_expanded() {
        let selection = RowSelection::parse("1-4000000000").unwrap();
        assert!(selection.contains(1));
        assert!(selection.contains(3_999_999_999));
        assert!(!selection.contains(4_000_000_001));
        assert_eq!(selection.file_name(), "plaintest_rows_1-4000000000.csv");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(RowSelection::parse(""), Err(RowSelectionError::Empty)));
        assert!(matches!(
            RowSelection::parse("5-2"),
            Err(RowSelectionError::ReversedRange(_))
        ));
        assert!(matches!(
            RowSelection::parse("a-b"),
            Err(RowSelectionError::InvalidFormat(_))
        ));
        assert!(matches!(
            RowSelection::parse("0"),
            Err(RowSelectionError::InvalidRow(_))
        ));
        assert!(matches!(
            RowSelection::parse(","),
            Err(RowSelectionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_file_name_is_derived_from_selection() {
        assert_eq!(
            RowSelection::parse("1,3,5").unwrap().file_name(),
            "plaintest_rows_1_3_5.csv"
        );
        assert_eq!(
            RowSelection::parse("2-4").unwrap().file_name(),
            "plaintest_rows_2-4.csv"
        );
    }

    #[test]
    fn test_filter_rows_range_keeps_header() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("users.csv");
        fs::write(&source, "id,name\n1,a\n2,b\n3,c\n4,d\n5,e\n").unwrap();

        let selection = RowSelection::parse("2-4").unwrap();
        let out = filter_rows(&source, &selection, &dir.path().join("tmp")).unwrap();

        let content = fs::read_to_string(out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["id,name", "2,b", "3,c", "4,d"]);
    }

    #[test]
    fn test_filter_rows_missing_source() {
        let dir = TempDir::new().unwrap();
        let selection = RowSelection::parse("1").unwrap();
        let err = filter_rows(&dir.path().join("missing.csv"), &selection, dir.path()).unwrap_err();
        assert!(matches!(err, RowSelectionError::Read { .. }));
    }
}
