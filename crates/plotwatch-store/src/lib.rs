//! plotwatch-store: In-memory, write-once analysis result store.
//!
//! The store is the only shared mutable collaborator around the
//! pipeline. Its lifecycle is explicit: created at service start
//! ([`ResultStore::new`]), cleared at service stop
//! ([`ResultStore::clear`]). Access goes exclusively through
//! [`put`](ResultStore::put) / [`get`](ResultStore::get) /
//! [`list`](ResultStore::list); the pipeline itself performs one `put`
//! per run and never updates or deletes a stored result.

use std::collections::HashMap;
use std::sync::RwLock;

use plotwatch_pipeline::Summary;
use plotwatch_render::AnalysisReport;
use plotwatch_render::report::ReportMetadata;
use serde::{Deserialize, Serialize};

/// Listing entry: everything a results index needs, without the image
/// payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSummary {
    /// Result identifier.
    pub result_id: String,
    /// Aggregate statistics of the run.
    pub summary: Summary,
    /// Source dimension metadata of the run.
    pub metadata: ReportMetadata,
}

/// Errors from store operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// A result with the same id is already stored. Results are
    /// write-once; ids must be unique across held results.
    #[error("result id already stored: {0}")]
    DuplicateId(String),

    /// The store lock was poisoned by a panicking writer.
    #[error("result store lock poisoned")]
    Poisoned,
}

/// Inner state behind the lock: reports by id plus insertion order.
#[derive(Debug, Default)]
struct Inner {
    reports: HashMap<String, AnalysisReport>,
    order: Vec<String>,
}

/// Keyed in-memory store of analysis reports.
///
/// Internally synchronized; shared references can be used from multiple
/// worker threads without external locking.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: RwLock<Inner>,
}

impl ResultStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a report under its result id. Write-once: storing a second
    /// report with the same id is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is already present,
    /// or [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn put(&self, report: AnalysisReport) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let id = report.result_id.clone();
        if inner.reports.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        inner.order.push(id.clone());
        inner.reports.insert(id, report);
        Ok(())
    }

    /// Retrieve a stored report by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn get(&self, result_id: &str) -> Result<Option<AnalysisReport>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.reports.get(result_id).cloned())
    }

    /// List stored results in insertion order, without image payloads.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn list(&self) -> Result<Vec<StoredSummary>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.reports.get(id))
            .map(|report| StoredSummary {
                result_id: report.result_id.clone(),
                summary: report.summary.clone(),
                metadata: report.metadata.clone(),
            })
            .collect())
    }

    /// Number of stored results.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.order.len())
    }

    /// Whether the store holds no results.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Drop every stored result. Called at service shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the lock is poisoned.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.reports.clear();
        inner.order.clear();
        Ok(())
    }
}
