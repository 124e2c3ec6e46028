//! Integration tests for liftboard-data

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use liftboard_data::{
    ColumnSummary, DataError, ExcelSource, HttpResponse, HttpTransport, SheetReader, SourceKind,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_reader() -> SheetReader {
    let path = fixture_path("results.xlsx");
    SheetReader::new(path.to_str().unwrap()).expect("Failed to create reader")
}

#[test]
fn test_excel_source_sheets() {
    let source = ExcelSource::new(fixture_path("results.xlsx"));
    let workbook = source.read().expect("Failed to open Excel file");

    assert_eq!(workbook.sheet_names(), vec!["Results", "Summary", "Empty"]);
}

#[test]
fn test_excel_sheet_rows_default_sheet() {
    let source = ExcelSource::new(fixture_path("results.xlsx"));
    let rows = source.sheet_rows(None).expect("Failed to read rows");

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].get("Lifter"), Some("John Smith"));
    assert_eq!(rows[0].get("Bodyweight(Pounds)"), Some("181.5"));
    assert_eq!(rows[0].get("Squat - Single Max"), Some("455"));
}

#[test]
fn test_excel_sheet_rows_unknown_sheet() {
    let source = ExcelSource::new(fixture_path("results.xlsx"));
    let err = source.sheet_rows(Some("Nope")).unwrap_err();
    assert!(matches!(err, DataError::SheetNotFound(_)));
}

#[tokio::test]
async fn test_local_reader_load() {
    let reader = fixture_reader();

    assert_eq!(reader.kind(), SourceKind::Local);
    assert!(reader.load().await);
    assert!(reader.load().await);
    assert_eq!(
        reader.sheet_names().await.unwrap(),
        vec!["Results", "Summary", "Empty"]
    );
}

#[tokio::test]
async fn test_local_zero_rows_are_kept() {
    let reader = fixture_reader();

    let rows = reader.rows(None).await.unwrap();
    let last = rows.last().unwrap();

    assert_eq!(last.get("Lifter"), Some("Zed Zero"));
    assert_eq!(last.get("Total Dots"), Some("0"));
}

#[tokio::test]
async fn test_local_named_sheet() {
    let reader = fixture_reader();

    let rows = reader.rows(Some("Summary")).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("Value"), Some("Spring Open"));
}

#[tokio::test]
async fn test_local_unknown_sheet_keeps_reader_usable() {
    let reader = fixture_reader();

    let err = reader.rows(Some("Deadlifts")).await.unwrap_err();
    assert!(matches!(err, DataError::SheetNotFound(name) if name == "Deadlifts"));

    assert_eq!(reader.row_count(None).await.unwrap(), 4);
}

#[tokio::test]
async fn test_local_empty_sheet() {
    let reader = fixture_reader();

    assert_eq!(reader.row_count(Some("Empty")).await.unwrap(), 0);
    assert!(reader.columns(Some("Empty")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_local_columns() {
    let reader = fixture_reader();

    assert_eq!(
        reader.columns(None).await.unwrap(),
        vec![
            "Lifter",
            "Bodyweight(Pounds)",
            "Total Dots",
            "Squat - Single Max",
            "Bench - Single Max",
            "Deadlift - Single Max",
        ]
    );
}

#[tokio::test]
async fn test_local_search() {
    let reader = fixture_reader();

    let results = reader.search("smith", None).await.unwrap();
    let names: Vec<_> = results.iter().filter_map(|r| r.get("Lifter")).collect();

    assert_eq!(names, vec!["John Smith", "Jane Smith"]);
}

#[tokio::test]
async fn test_local_search_matches_numbers() {
    let reader = fixture_reader();

    let results = reader.search("402.7", None).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_local_column_stats() {
    let reader = fixture_reader();

    let summary = reader
        .column_stats("Squat - Single Max", None)
        .await
        .unwrap();
    let stats = summary.stats().expect("numeric column");

    // 455, 275, 500, 0
    assert_eq!(stats.count, 4);
    assert_eq!(stats.sum, 1230.0);
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 500.0);
    assert_eq!(stats.median, 365.0);
}

#[tokio::test]
async fn test_local_column_stats_text_column() {
    let reader = fixture_reader();

    let summary = reader.column_stats("Lifter", None).await.unwrap();
    match summary {
        ColumnSummary::NoNumericData(err) => {
            assert_eq!(err.to_string(), "No numeric data found for column \"Lifter\"");
        }
        ColumnSummary::Numeric(stats) => panic!("Unexpected stats: {:?}", stats),
    }
}

#[tokio::test]
async fn test_local_all_data() {
    let reader = fixture_reader();

    let sheets = reader.all_data().await.unwrap();
    let counts: Vec<_> = sheets
        .iter()
        .map(|s| (s.name.as_str(), s.rows.len()))
        .collect();

    assert_eq!(counts, vec![("Results", 4), ("Summary", 2), ("Empty", 0)]);
}

#[tokio::test]
async fn test_local_data_resident_until_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.xlsx");
    std::fs::copy(fixture_path("results.xlsx"), &path).unwrap();

    let reader = SheetReader::new(path.to_str().unwrap()).unwrap();
    assert!(reader.load().await);
    assert_eq!(reader.row_count(None).await.unwrap(), 4);

    // Resident data survives the file going away until the next load()
    std::fs::remove_file(&path).unwrap();
    assert_eq!(reader.row_count(None).await.unwrap(), 4);
    assert!(!reader.load().await);
}

/// Transport that always redirects once, then serves a fixed export
struct RedirectingTransport;

#[async_trait]
impl HttpTransport for RedirectingTransport {
    async fn get(&self, url: &str) -> liftboard_data::Result<HttpResponse> {
        if url.contains("docs.google.com") {
            Ok(HttpResponse {
                status: 307,
                location: Some("https://doc-0c.googleusercontent.test/export/abc".to_string()),
                body: String::new(),
            })
        } else {
            Ok(HttpResponse {
                status: 200,
                location: None,
                body: "\"Lifter\",\"Total Dots\"\n\"Smith, John\",401\n,\n".to_string(),
            })
        }
    }
}

#[tokio::test]
async fn test_remote_reader_through_redirect() {
    let reader = SheetReader::with_transport(
        "https://docs.google.com/spreadsheets/d/1AbC/edit#gid=0",
        Arc::new(RedirectingTransport),
    );

    assert_eq!(reader.kind(), SourceKind::Remote);
    assert!(reader.load().await);

    let rows = reader.rows(None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Lifter"), Some("Smith, John"));
    assert_eq!(reader.sheet_names().await.unwrap(), vec!["Sheet1"]);
}
