//! Column statistics.

use thiserror::Error;

use crate::row::Row;

/// Summary statistics over the numeric values of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// A column had no value that could be read as a number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No numeric data found for column \"{column}\"")]
pub struct NoNumericData {
    pub column: String,
}

/// Outcome of a column statistics query
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric(ColumnStats),
    NoNumericData(NoNumericData),
}

impl ColumnSummary {
    /// Statistics, if the column had numeric data
    pub fn stats(&self) -> Option<&ColumnStats> {
        match self {
            ColumnSummary::Numeric(stats) => Some(stats),
            ColumnSummary::NoNumericData(_) => None,
        }
    }
}

/// Read a cell as a finite number.
///
/// Surrounding whitespace is ignored; blank cells and non-finite values are
/// not numeric.
pub fn coerce_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl ColumnStats {
    /// Compute statistics over a set of values, `None` if it is empty
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let average = sum / count as f64;

        values.sort_by(f64::total_cmp);
        let min = values[0];
        let max = values[count - 1];

        let mid = count / 2;
        let median = if count % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };

        Some(Self {
            count,
            sum,
            average,
            min,
            max,
            median,
        })
    }
}

/// Statistics for `column` over `rows`, skipping missing and non-numeric cells
pub fn column_summary(rows: &[Row], column: &str) -> ColumnSummary {
    let values = rows
        .iter()
        .filter_map(|row| row.get(column))
        .filter_map(coerce_number)
        .collect();

    match ColumnStats::from_values(values) {
        Some(stats) => ColumnSummary::Numeric(stats),
        None => ColumnSummary::NoNumericData(NoNumericData {
            column: column.to_string(),
        }),
    }
}
