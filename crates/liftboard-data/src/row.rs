//! Row model shared by every data source.
//!
//! A sheet's header is stored once behind an [`Arc`] and every [`Row`] of that
//! sheet points at it, so all rows of a sheet carry the same column keys.

use std::sync::Arc;

/// Column names of one sheet, in header order
pub type Header = Arc<Vec<String>>;

/// One record: an ordered mapping from column name to cell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    header: Header,
    values: Vec<String>,
}

impl Row {
    /// Build a row from a header and positional values.
    ///
    /// Missing trailing values become empty strings; surplus values are dropped.
    pub fn new(header: Header, mut values: Vec<String>) -> Self {
        values.resize(header.len(), String::new());
        Self { header, values }
    }

    /// Value of a column, `None` if the column is not part of this row
    pub fn get(&self, column: &str) -> Option<&str> {
        self.header
            .iter()
            .position(|name| name == column)
            .map(|idx| self.values[idx].as_str())
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.header
    }

    /// Cell values in header order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterate over `(column, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Case-insensitive substring match against every cell.
    ///
    /// `needle` must already be lower-cased.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.values
            .iter()
            .any(|value| value.to_lowercase().contains(needle))
    }
}
