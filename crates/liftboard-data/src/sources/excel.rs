//! Local workbook data source using calamine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::row::{Header, Row};
use crate::workbook::{Sheet, Workbook};

/// Name given to header cells that are empty
const EMPTY_HEADER: &str = "__EMPTY";

/// Workbook file on disk (xlsx, xlsm, xlsb, xls or ods)
#[derive(Debug, Clone)]
pub struct ExcelSource {
    path: PathBuf,
}

impl ExcelSource {
    /// Create a source for a workbook path. The file is not touched until [`ExcelSource::read`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path to the workbook file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every sheet of the workbook from disk
    pub fn read(&self) -> Result<Workbook> {
        let path_str = self.path.display().to_string();

        if !self.path.exists() {
            return Err(DataError::FileNotFound(path_str));
        }

        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path_str, e)))?;

        let names = workbook.sheet_names();
        if names.is_empty() {
            return Err(DataError::WorkbookOpen(format!(
                "{}: workbook has no sheets",
                path_str
            )));
        }

        let mut sheets = Vec::with_capacity(names.len());
        for name in names {
            let range = workbook.worksheet_range(&name)?;
            let rows = Self::range_to_rows(&range);
            debug!(sheet = %name, rows = rows.len(), "Read worksheet");
            sheets.push(Sheet::new(name, rows));
        }

        Ok(Workbook::new(sheets))
    }

    /// Rows of one sheet, the first sheet when `sheet` is `None`
    pub fn sheet_rows(&self, sheet: Option<&str>) -> Result<Vec<Row>> {
        let workbook = self.read()?;
        let rows = workbook.sheet(sheet)?.rows.as_ref().clone();
        Ok(rows)
    }

    /// Convert a used range to rows, taking its first row as the header.
    ///
    /// Rows made only of blank cells are skipped; every other row is kept.
    fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
        let mut iter = range.rows();

        let Some(header_cells) = iter.next() else {
            return Vec::new();
        };
        let header: Header = Arc::new(Self::header_names(header_cells));

        iter.map(|cells| cells.iter().map(Self::cell_to_string).collect::<Vec<_>>())
            .filter(|values| values.iter().any(|v| !v.is_empty()))
            .map(|values| Row::new(Arc::clone(&header), values))
            .collect()
    }

    /// Build unique column names from the header cells.
    ///
    /// Blank cells become `__EMPTY`, `__EMPTY_1`, ...; repeated names get a
    /// `_1`, `_2`, ... suffix.
    fn header_names(cells: &[Data]) -> Vec<String> {
        let mut seen = HashSet::new();

        cells
            .iter()
            .map(|cell| {
                let text = Self::cell_to_string(cell).trim().to_string();
                let base = if text.is_empty() {
                    EMPTY_HEADER.to_string()
                } else {
                    text
                };

                let mut name = base.clone();
                let mut suffix = 1;
                while !seen.insert(name.clone()) {
                    name = format!("{}_{}", base, suffix);
                    suffix += 1;
                }
                name
            })
            .collect()
    }

    /// Convert a calamine cell to a string
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                // Whole floats print without a decimal point
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => b.to_string(),
            Data::Error(e) => format!("#ERROR: {:?}", e),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(ExcelSource::cell_to_string(&Data::Empty), "");
        assert_eq!(
            ExcelSource::cell_to_string(&Data::String("hello".to_string())),
            "hello"
        );
        assert_eq!(ExcelSource::cell_to_string(&Data::Int(42)), "42");
        assert_eq!(ExcelSource::cell_to_string(&Data::Float(3.14)), "3.14");
        assert_eq!(ExcelSource::cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(ExcelSource::cell_to_string(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_header_names_blank_and_duplicates() {
        let cells = vec![
            Data::String("Lifter".to_string()),
            Data::Empty,
            Data::String("Lifter".to_string()),
            Data::Empty,
            Data::String("Lifter".to_string()),
        ];

        assert_eq!(
            ExcelSource::header_names(&cells),
            vec!["Lifter", "__EMPTY", "Lifter_1", "__EMPTY_1", "Lifter_2"]
        );
    }

    #[test]
    fn test_range_to_rows() {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Lifter".to_string()));
        range.set_value((0, 1), Data::String("Total".to_string()));
        range.set_value((1, 0), Data::String("Ann".to_string()));
        range.set_value((1, 1), Data::Float(0.0));
        range.set_value((3, 0), Data::String("Bea".to_string()));

        let rows = ExcelSource::range_to_rows(&range);

        // Row 2 is blank and skipped; zero values are kept
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Total"), Some("0"));
        assert_eq!(rows[1].get("Lifter"), Some("Bea"));
        assert_eq!(rows[1].get("Total"), Some(""));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(ExcelSource::range_to_rows(&range).is_empty());
    }

    #[test]
    fn test_missing_file() {
        let source = ExcelSource::new("/nonexistent/path/file.xlsx");
        assert!(matches!(source.read(), Err(DataError::FileNotFound(_))));
    }

    #[test]
    fn test_not_a_workbook() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        std::fs::write(file.path(), b"definitely not a zip archive").unwrap();

        let source = ExcelSource::new(file.path());
        assert!(matches!(source.read(), Err(DataError::WorkbookOpen(_))));
    }
}
