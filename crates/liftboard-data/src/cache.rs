//! Time-based cache for remote sheet data.
//!
//! A single slot holding the last fetched rows and when they were fetched.
//! Staleness is checked lazily on access. The slot lock is never held across
//! a fetch, so two callers that both see a stale entry will both fetch; the
//! later write wins. Both fetches read the same export, so either result is
//! acceptable.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::error::Result;
use crate::row::Row;

/// Default validity window for fetched data
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Rows from one fetch and the instant they were stored
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub rows: Arc<Vec<Row>>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: Arc::new(rows),
            fetched_at: Instant::now(),
        }
    }

    /// Whether the entry is older than `timeout`
    pub fn is_stale(&self, timeout: Duration) -> bool {
        self.fetched_at.elapsed() > timeout
    }
}

/// Single-slot cache with a staleness window
#[derive(Debug)]
pub struct DataCache {
    slot: RwLock<Option<Arc<CacheEntry>>>,
    timeout: Duration,
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TIMEOUT)
    }
}

impl DataCache {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            timeout,
        }
    }

    /// Validity window of this cache
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current entry if it is still fresh
    pub async fn fresh(&self) -> Option<Arc<CacheEntry>> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|entry| !entry.is_stale(self.timeout))
            .cloned()
    }

    /// Current entry regardless of age
    pub async fn last(&self) -> Option<Arc<CacheEntry>> {
        self.slot.read().await.clone()
    }

    /// Replace the stored entry wholesale
    pub async fn store(&self, rows: Vec<Row>) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry::new(rows));
        *self.slot.write().await = Some(Arc::clone(&entry));
        entry
    }

    /// Return fresh rows, or run `fetch` and store its result.
    ///
    /// A failed fetch leaves the previous entry in place.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Arc<Vec<Row>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Row>>>,
    {
        if let Some(entry) = self.fresh().await {
            debug!(age = ?entry.fetched_at.elapsed(), "Serving cached rows");
            return Ok(Arc::clone(&entry.rows));
        }

        let rows = fetch().await?;
        let entry = self.store(rows).await;
        debug!(rows = entry.rows.len(), "Refreshed cache");
        Ok(Arc::clone(&entry.rows))
    }

    /// Like [`DataCache::get_or_refresh`], but a failed refresh serves the
    /// last stored rows. The error surfaces only when nothing was ever stored.
    pub async fn get_or_last<F, Fut>(&self, fetch: F) -> Result<Arc<Vec<Row>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Row>>>,
    {
        match self.get_or_refresh(fetch).await {
            Ok(rows) => Ok(rows),
            Err(err) => match self.last().await {
                Some(entry) => {
                    error!(
                        error = %err,
                        age = ?entry.fetched_at.elapsed(),
                        "Refresh failed, serving last fetched rows"
                    );
                    Ok(Arc::clone(&entry.rows))
                }
                None => Err(err),
            },
        }
    }
}
