//! Data source implementations.
//!
//! - [`excel`]: workbook files on disk, read with calamine
//! - [`remote`]: published spreadsheets fetched as CSV over HTTP
//! - [`csv`]: the CSV text parser used by the remote source

pub mod csv;
pub mod excel;
pub mod remote;

pub use csv::CsvOptions;
pub use excel::ExcelSource;
pub use remote::{HttpResponse, HttpTransport, RemoteSource, ReqwestTransport};
