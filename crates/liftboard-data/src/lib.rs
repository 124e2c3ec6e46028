//! # liftboard-data
//!
//! Spreadsheet data access for liftboard: load competition results from a
//! local workbook or a published Google Sheet and query them.
//!
//! ## Features
//!
//! - **Workbook Support**: Read every sheet of `.xlsx`/`.xls`/`.ods` files using `calamine`
//! - **Published Sheets**: Fetch the CSV export of a Google Sheets URL, following redirects
//! - **Caching**: Remote data is reused for five minutes before it is fetched again
//! - **Queries**: Sheet listing, paging, case-insensitive search, column statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use liftboard_data::{ColumnSummary, SheetReader};
//!
//! let reader = SheetReader::new("./data/results.xlsx")?;
//! if !reader.load().await {
//!     eprintln!("Failed to load data source");
//! }
//!
//! let hits = reader.search("smith", None).await?;
//! if let ColumnSummary::Numeric(stats) = reader.column_stats("Total Dots", None).await? {
//!     println!("median {}", stats.median);
//! }
//! ```

pub mod cache;
pub mod error;
pub mod reader;
pub mod row;
pub mod sources;
pub mod stats;
pub mod workbook;

// Re-exports
pub use cache::{CacheEntry, DataCache, DEFAULT_CACHE_TIMEOUT};
pub use error::{DataError, Result};
pub use reader::{Page, SheetReader, SourceKind};
pub use row::{Header, Row};
pub use sources::{CsvOptions, ExcelSource, HttpResponse, HttpTransport, RemoteSource};
pub use stats::{ColumnStats, ColumnSummary, NoNumericData};
pub use workbook::{Sheet, Workbook};
