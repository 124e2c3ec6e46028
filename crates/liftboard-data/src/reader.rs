//! Query engine over a configured data source.
//!
//! A [`SheetReader`] is built once per location. The location decides the
//! source kind at construction: published spreadsheet URLs are fetched as CSV
//! through a [`DataCache`], anything else is opened as a workbook file and
//! kept resident until the next [`SheetReader::load`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::cache::DataCache;
use crate::error::{DataError, Result};
use crate::row::Row;
use crate::sources::remote::{self, HttpTransport, RemoteSource, REMOTE_SHEET_NAME};
use crate::sources::ExcelSource;
use crate::stats::{self, ColumnSummary};
use crate::workbook::{Sheet, Workbook};

/// Kind of source behind a reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Workbook file on disk
    Local,
    /// Published spreadsheet fetched as CSV
    Remote,
}

enum Source {
    Local {
        excel: ExcelSource,
        workbook: RwLock<Option<Arc<Workbook>>>,
    },
    Remote {
        remote: RemoteSource,
        cache: DataCache,
    },
}

/// A window of rows from one sheet
#[derive(Debug, Clone)]
pub struct Page {
    /// Sheet the rows come from
    pub sheet: String,
    /// Zero-based index of the first row in `rows`
    pub offset: usize,
    /// Number of rows in the whole sheet
    pub total: usize,
    pub rows: Vec<Row>,
}

/// Reads and queries one configured spreadsheet location
pub struct SheetReader {
    location: String,
    source: Source,
}

impl std::fmt::Debug for SheetReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetReader")
            .field("location", &self.location)
            .field("kind", &self.kind())
            .finish()
    }
}

impl SheetReader {
    /// Create a reader for a file path or spreadsheet URL
    pub fn new(location: impl Into<String>) -> Result<Self> {
        let location = location.into();
        if remote::is_remote_location(&location) {
            let remote = RemoteSource::new(location.clone())?;
            Ok(Self::remote(location, remote))
        } else {
            Ok(Self::local(location))
        }
    }

    /// Create a reader whose remote fetches go through `transport`
    pub fn with_transport(location: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let location = location.into();
        if remote::is_remote_location(&location) {
            let remote = RemoteSource::with_transport(location.clone(), transport);
            Self::remote(location, remote)
        } else {
            Self::local(location)
        }
    }

    fn local(location: String) -> Self {
        Self {
            source: Source::Local {
                excel: ExcelSource::new(&location),
                workbook: RwLock::new(None),
            },
            location,
        }
    }

    fn remote(location: String, remote: RemoteSource) -> Self {
        Self {
            location,
            source: Source::Remote {
                remote,
                cache: DataCache::default(),
            },
        }
    }

    /// Set how long fetched remote data stays fresh. No effect on local sources.
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        if let Source::Remote { cache, .. } = &mut self.source {
            *cache = DataCache::new(timeout);
        }
        self
    }

    /// Configured location string
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> SourceKind {
        match self.source {
            Source::Local { .. } => SourceKind::Local,
            Source::Remote { .. } => SourceKind::Remote,
        }
    }

    /// Load the source, logging and absorbing any failure.
    ///
    /// Local workbooks are re-read from disk on every call; remote data is
    /// fetched only when the cache is empty or stale.
    pub async fn load(&self) -> bool {
        match self.try_load().await {
            Ok(()) => true,
            Err(err) => {
                match self.kind() {
                    SourceKind::Local => error!(error = %err, "Failed to load Excel file"),
                    SourceKind::Remote => error!(error = %err, "Failed to load Google Sheets"),
                }
                false
            }
        }
    }

    /// Load the source, returning the typed error on failure
    pub async fn try_load(&self) -> Result<()> {
        match &self.source {
            Source::Local { excel, workbook } => {
                let loaded = Arc::new(excel.read()?);
                info!(
                    path = %excel.path().display(),
                    sheets = loaded.sheets().len(),
                    "Loaded workbook"
                );
                *workbook.write().await = Some(loaded);
                Ok(())
            }
            Source::Remote { remote, cache } => {
                cache.get_or_refresh(|| remote.fetch()).await?;
                Ok(())
            }
        }
    }

    /// Current workbook, loading it first if needed
    async fn workbook(&self) -> Result<Arc<Workbook>> {
        match &self.source {
            Source::Local { workbook, .. } => {
                if let Some(loaded) = workbook.read().await.as_ref() {
                    return Ok(Arc::clone(loaded));
                }
                self.try_load().await?;
                workbook.read().await.clone().ok_or_else(|| {
                    DataError::SourceUnavailable(self.location.clone())
                })
            }
            Source::Remote { remote, cache } => {
                let rows = cache.get_or_last(|| remote.fetch()).await?;
                Ok(Arc::new(Workbook::new(vec![Sheet {
                    name: REMOTE_SHEET_NAME.to_string(),
                    rows,
                }])))
            }
        }
    }

    /// Names of all sheets in source order
    pub async fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.workbook().await?.sheet_names())
    }

    /// Resolve an optional sheet name to the name actually used
    pub async fn resolve_sheet(&self, sheet: Option<&str>) -> Result<String> {
        Ok(self.workbook().await?.sheet(sheet)?.name.clone())
    }

    /// Rows of a sheet, the first sheet when `sheet` is `None`
    pub async fn rows(&self, sheet: Option<&str>) -> Result<Arc<Vec<Row>>> {
        let workbook = self.workbook().await?;
        let rows = Arc::clone(&workbook.sheet(sheet)?.rows);
        Ok(rows)
    }

    /// Every sheet with its rows
    pub async fn all_data(&self) -> Result<Vec<Sheet>> {
        Ok(self.workbook().await?.sheets().to_vec())
    }

    pub async fn row_count(&self, sheet: Option<&str>) -> Result<usize> {
        Ok(self.rows(sheet).await?.len())
    }

    /// Column names taken from the first row, empty when the sheet has no rows
    pub async fn columns(&self, sheet: Option<&str>) -> Result<Vec<String>> {
        let rows = self.rows(sheet).await?;
        Ok(rows
            .first()
            .map(|row| row.columns().to_vec())
            .unwrap_or_default())
    }

    /// Up to `limit` rows starting at `offset`
    pub async fn page(&self, sheet: Option<&str>, offset: usize, limit: usize) -> Result<Page> {
        let workbook = self.workbook().await?;
        let target = workbook.sheet(sheet)?;

        Ok(Page {
            sheet: target.name.clone(),
            offset,
            total: target.rows.len(),
            rows: target.rows.iter().skip(offset).take(limit).cloned().collect(),
        })
    }

    /// Rows with any cell containing `term`, ignoring case, in sheet order
    pub async fn search(&self, term: &str, sheet: Option<&str>) -> Result<Vec<Row>> {
        let rows = self.rows(sheet).await?;
        let needle = term.to_lowercase();

        Ok(rows
            .iter()
            .filter(|row| row.contains_lowercase(&needle))
            .cloned()
            .collect())
    }

    /// Statistics over the numeric values of `column`
    pub async fn column_stats(&self, column: &str, sheet: Option<&str>) -> Result<ColumnSummary> {
        let rows = self.rows(sheet).await?;
        Ok(stats::column_summary(&rows, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::remote::tests::FakeTransport;

    const SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/meet2024/edit?gid=7";
    const EXPORT_URL: &str =
        "https://docs.google.com/spreadsheets/d/meet2024/export?format=csv&gid=7";

    const RESULTS_CSV: &str = "\
Lifter,Total Dots,Squat - Single Max
John Smith,400.5,500
jane smith,380,
Bob,0,0
0,0,0
";

    fn remote_reader() -> (SheetReader, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::default());
        transport.respond(EXPORT_URL, 200, None, RESULTS_CSV);
        let reader = SheetReader::with_transport(SHEET_URL, transport.clone());
        (reader, transport)
    }

    #[test]
    fn test_kind_from_location() {
        assert_eq!(SheetReader::local("data.xlsx".into()).kind(), SourceKind::Local);
        let (reader, _) = remote_reader();
        assert_eq!(reader.kind(), SourceKind::Remote);
    }

    #[tokio::test]
    async fn test_remote_sheet_names() {
        let (reader, _) = remote_reader();
        assert_eq!(reader.sheet_names().await.unwrap(), vec!["Sheet1"]);
    }

    #[tokio::test]
    async fn test_remote_rows_drop_degenerate() {
        let (reader, _) = remote_reader();
        let rows = reader.rows(None).await.unwrap();

        // "Bob,0,0" has a non-zero cell and stays; "0,0,0" is dropped
        assert_eq!(rows.len(), 3);
        assert_eq!(reader.row_count(Some("Sheet1")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_remote_unknown_sheet() {
        let (reader, _) = remote_reader();
        let err = reader.rows(Some("Results")).await.unwrap_err();
        assert!(matches!(err, DataError::SheetNotFound(name) if name == "Results"));
    }

    #[tokio::test]
    async fn test_cache_hits_within_window() {
        let (reader, transport) = remote_reader();

        reader.rows(None).await.unwrap();
        reader.rows(None).await.unwrap();
        assert!(reader.load().await);

        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_refetches_after_window() {
        let transport = Arc::new(FakeTransport::default());
        transport.respond(EXPORT_URL, 200, None, RESULTS_CSV);
        let reader = SheetReader::with_transport(SHEET_URL, transport.clone())
            .with_cache_timeout(Duration::from_millis(20));

        reader.rows(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        reader.rows(None).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_last_fetched_rows() {
        let transport = Arc::new(FakeTransport::default());
        transport.respond(EXPORT_URL, 200, None, "Lifter\nAnn\n");
        let reader = SheetReader::with_transport(SHEET_URL, transport.clone())
            .with_cache_timeout(Duration::from_millis(20));

        assert!(reader.load().await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        transport.respond(EXPORT_URL, 503, None, "");

        assert!(!reader.load().await);
        let rows = reader.rows(None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Lifter"), Some("Ann"));
        assert_eq!(reader.search("ann", None).await.unwrap().len(), 1);
        assert_eq!(reader.sheet_names().await.unwrap(), vec!["Sheet1"]);
    }

    #[tokio::test]
    async fn test_search_case_insensitive_in_order() {
        let (reader, _) = remote_reader();
        let results = reader.search("SMITH", None).await.unwrap();

        let names: Vec<_> = results.iter().filter_map(|r| r.get("Lifter")).collect();
        assert_eq!(names, vec!["John Smith", "jane smith"]);
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let (reader, _) = remote_reader();
        assert!(reader.search("zzz", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_columns() {
        let (reader, _) = remote_reader();
        assert_eq!(
            reader.columns(None).await.unwrap(),
            vec!["Lifter", "Total Dots", "Squat - Single Max"]
        );
    }

    #[tokio::test]
    async fn test_empty_sheet_counts() {
        let transport = Arc::new(FakeTransport::default());
        transport.respond(EXPORT_URL, 200, None, "Lifter,Total Dots\n");
        let reader = SheetReader::with_transport(SHEET_URL, transport);

        assert_eq!(reader.row_count(None).await.unwrap(), 0);
        assert!(reader.columns(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_column_stats() {
        let (reader, _) = remote_reader();

        let summary = reader.column_stats("Total Dots", None).await.unwrap();
        let stats = summary.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max, 400.5);
        assert_eq!(stats.median, 380.0);

        let summary = reader.column_stats("Lifter", None).await.unwrap();
        assert!(matches!(summary, ColumnSummary::NoNumericData(_)));
    }

    #[tokio::test]
    async fn test_page() {
        let (reader, _) = remote_reader();

        let page = reader.page(None, 1, 10).await.unwrap();
        assert_eq!(page.sheet, "Sheet1");
        assert_eq!(page.total, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].get("Lifter"), Some("jane smith"));

        let past_end = reader.page(None, 10, 5).await.unwrap();
        assert!(past_end.rows.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_then_recovery() {
        let transport = Arc::new(FakeTransport::default());
        let reader = SheetReader::with_transport(SHEET_URL, transport.clone());

        assert!(!reader.load().await);
        assert!(matches!(
            reader.rows(None).await,
            Err(DataError::HttpStatus(404))
        ));

        transport.respond(EXPORT_URL, 200, None, RESULTS_CSV);
        assert!(reader.load().await);
        assert_eq!(reader.row_count(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_malformed_remote_location() {
        let transport = Arc::new(FakeTransport::default());
        let reader = SheetReader::with_transport(
            "https://docs.google.com/spreadsheets/create",
            transport.clone(),
        );

        assert!(!reader.load().await);
        assert!(matches!(
            reader.try_load().await,
            Err(DataError::MalformedLocation(_))
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let reader = SheetReader::new("/nonexistent/results.xlsx").unwrap();

        assert!(!reader.load().await);
        assert!(matches!(
            reader.sheet_names().await,
            Err(DataError::FileNotFound(_))
        ));
    }
}
