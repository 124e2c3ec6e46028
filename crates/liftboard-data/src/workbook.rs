//! Sheets and workbooks.

use std::sync::Arc;

use crate::error::{DataError, Result};
use crate::row::Row;

/// A named table of rows sharing one header
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sheet name as it appears in the source
    pub name: String,
    /// Rows in source order
    pub rows: Arc<Vec<Row>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows: Arc::new(rows),
        }
    }
}

/// Ordered collection of sheets loaded from one source
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// All sheets in workbook order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Resolve a sheet by name, or the first sheet when `name` is `None`
    pub fn sheet(&self, name: Option<&str>) -> Result<&Sheet> {
        match name {
            Some(name) => self
                .sheets
                .iter()
                .find(|s| s.name == name)
                .ok_or_else(|| DataError::SheetNotFound(name.to_string())),
            None => self
                .sheets
                .first()
                .ok_or_else(|| DataError::SheetNotFound("No sheets in workbook".to_string())),
        }
    }
}
