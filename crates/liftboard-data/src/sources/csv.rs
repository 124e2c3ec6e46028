//! CSV text parser for published-sheet exports.
//!
//! This is a line-oriented textual transformation rather than a strict
//! RFC 4180 reader: a quote character toggles the "inside quotes" state and is
//! never copied into the field, so `""` inside a quoted field disappears
//! instead of collapsing to one quote. Records cannot span lines.

use std::sync::Arc;

use crate::row::{Header, Row};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Drop rows whose cells are all empty or a literal zero
    pub drop_degenerate_rows: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            drop_degenerate_rows: true,
        }
    }
}

impl CsvOptions {
    /// Create options that keep every data row
    pub fn keep_all_rows() -> Self {
        Self {
            drop_degenerate_rows: false,
        }
    }
}

/// Parse CSV text with default options
pub fn parse(text: &str) -> Vec<Row> {
    parse_with_options(text, &CsvOptions::default())
}

/// Parse CSV text into rows keyed by the first non-empty line
pub fn parse_with_options(text: &str, options: &CsvOptions) -> Vec<Row> {
    let mut lines = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .skip_while(|line| line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let header: Header = Arc::new(split_line(header_line));

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| Row::new(Arc::clone(&header), split_line(line)))
        .filter(|row| !options.drop_degenerate_rows || !is_degenerate(row.values()))
        .collect()
}

/// Split one line into cleaned field values
fn split_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == QUOTE {
            in_quotes = !in_quotes;
        } else if c == DELIMITER && !in_quotes {
            values.push(clean_field(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    values.push(clean_field(&current));

    values
}

/// Trim a field and strip one leading and one trailing quote
fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(QUOTE).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(QUOTE).unwrap_or(trimmed);
    trimmed.to_string()
}

/// A row is degenerate when every cell is empty, `"0"` or `"0.0"`
pub fn is_degenerate(values: &[String]) -> bool {
    values
        .iter()
        .all(|value| value.is_empty() || value == "0" || value == "0.0")
}
