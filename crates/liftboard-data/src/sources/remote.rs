//! Published Google Sheets source.
//!
//! The configured sheet URL is rewritten to its CSV export form, fetched over
//! HTTP (redirects followed here, not by the client) and parsed with the
//! [`csv`](crate::sources::csv) parser.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::{redirect, Client, Url};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::row::Row;
use crate::sources::csv;

/// Marker that identifies a location string as a published spreadsheet
pub const REMOTE_MARKER: &str = "docs.google.com/spreadsheets";

/// Host the export URL is built against
pub const EXPORT_HOST: &str = "https://docs.google.com";

/// Sheet name reported for a remote source (the CSV export holds one sheet)
pub const REMOTE_SHEET_NAME: &str = "Sheet1";

/// Maximum number of redirects followed for one fetch
pub const MAX_REDIRECTS: usize = 10;

/// Raw HTTP response as seen by the fetch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

/// Minimal GET transport, so the redirect and cache logic can run without a network
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one GET without following redirects
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by reqwest with automatic redirects disabled
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

/// Whether a location string points at a published spreadsheet
pub fn is_remote_location(location: &str) -> bool {
    location.contains(REMOTE_MARKER)
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid regex"))
}

fn gid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"gid=([0-9]+)").expect("valid regex"))
}

/// Rewrite a spreadsheet URL to its CSV export URL.
///
/// The sheet id comes from the `/d/<id>` path segment and the sub-sheet from
/// an optional `gid=<n>` parameter, defaulting to `0`.
pub fn export_url(location: &str) -> Result<String> {
    let id = id_pattern()
        .captures(location)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| DataError::MalformedLocation(location.to_string()))?
        .as_str();

    let gid = gid_pattern()
        .captures(location)
        .and_then(|caps| caps.get(1))
        .map_or("0", |m| m.as_str());

    Ok(format!(
        "{}/spreadsheets/d/{}/export?format=csv&gid={}",
        EXPORT_HOST, id, gid
    ))
}

fn is_followed_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 307)
}

/// Resolve a `Location` header against the URL that produced it
fn resolve_location(base: &str, location: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(location))
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}

/// GET a URL, following 301/302/307 redirects, and return the 200 body
pub async fn fetch_text(transport: &dyn HttpTransport, url: &str) -> Result<String> {
    let mut current = url.to_string();

    for _ in 0..=MAX_REDIRECTS {
        let response = transport.get(&current).await?;

        if is_followed_redirect(response.status) {
            let location = response
                .location
                .filter(|l| !l.is_empty())
                .ok_or_else(|| DataError::MissingRedirectLocation {
                    status: response.status,
                    url: current.clone(),
                })?;
            let next = resolve_location(&current, &location);
            debug!(status = response.status, from = %current, to = %next, "Following redirect");
            current = next;
            continue;
        }

        if response.status != 200 {
            return Err(DataError::HttpStatus(response.status));
        }

        return Ok(response.body);
    }

    Err(DataError::TooManyRedirects(url.to_string()))
}

/// A published spreadsheet, fetched as CSV on demand
#[derive(Clone)]
pub struct RemoteSource {
    location: String,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl RemoteSource {
    /// Create a source using the default reqwest transport
    pub fn new(location: impl Into<String>) -> Result<Self> {
        Ok(Self::with_transport(
            location,
            Arc::new(ReqwestTransport::new()?),
        ))
    }

    /// Create a source with a custom transport
    pub fn with_transport(location: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            location: location.into(),
            transport,
        }
    }

    /// Configured spreadsheet URL
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Fetch and parse the export, bypassing any cache
    pub async fn fetch(&self) -> Result<Vec<Row>> {
        let url = export_url(&self.location)?;
        debug!(url = %url, "Fetching spreadsheet export");
        let body = fetch_text(self.transport.as_ref(), &url).await?;
        Ok(csv::parse(&body))
    }
}
