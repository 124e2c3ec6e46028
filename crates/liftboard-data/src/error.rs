//! Error types for the data access layer.

use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or querying a data source
#[derive(Debug, Error)]
pub enum DataError {
    /// Local workbook path does not exist
    #[error("Excel file not found at: {0}")]
    FileNotFound(String),

    /// Failed to open or parse a workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Sheet not found in the loaded source
    #[error("Sheet \"{0}\" not found")]
    SheetNotFound(String),

    /// Remote spreadsheet URL without a `/d/<id>/` segment
    #[error("Invalid Google Sheets URL: {0}")]
    MalformedLocation(String),

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Terminal response was not 200
    #[error("Failed to fetch CSV: {0}")]
    HttpStatus(u16),

    /// Redirect response without a usable `Location` header
    #[error("Redirect ({status}) from {url} has no Location header")]
    MissingRedirectLocation { status: u16, url: String },

    /// Redirect chain exceeded the hop limit
    #[error("Too many redirects while fetching {0}")]
    TooManyRedirects(String),

    /// Source has no data loaded and could not be loaded
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    /// Calamine error
    #[error("Excel error: {0}")]
    Calamine(String),
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Calamine(err.to_string())
    }
}
