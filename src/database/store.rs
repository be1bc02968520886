use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use super::backend::{PersistenceError, SeriesBackend};
use crate::catalog::samples::sample_drafts;
use crate::catalog::{
    compute_statistics, filter_and_sort, sanitize_draft, validate_draft, SeriesDetails, SeriesDraft,
    SeriesQuery, SeriesRecord, SeriesStatistics, ValidationErrors,
};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Series not found with ID: {0}")]
    NotFound(String),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Another change is still being saved")]
    Busy,
}

/// Owns the authoritative in-memory collection and keeps it in step with a
/// persistence backend.
///
/// Every mutation is persisted first and applied to memory only once the
/// backend confirms, so a failed call leaves the collection exactly as it was.
/// Only one mutation may be outstanding at a time; a second one is refused
/// with [`StoreError::Busy`] rather than queued.
pub struct SeriesStore {
    backend: Arc<dyn SeriesBackend>,
    series: RwLock<Vec<SeriesRecord>>,
    mutation: Mutex<()>,
}

impl SeriesStore {
    /// Create an empty store; call [`load_all`](Self::load_all) to populate it
    pub fn new(backend: Arc<dyn SeriesBackend>) -> Self {
        Self {
            backend,
            series: RwLock::new(Vec::new()),
            mutation: Mutex::new(()),
        }
    }

    /// Create a store and load the persisted collection into it
    pub async fn open(backend: Arc<dyn SeriesBackend>) -> StoreResult<Self> {
        let store = Self::new(backend);
        store.load_all().await?;
        Ok(store)
    }

    fn begin_mutation(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.mutation.try_lock().map_err(|_| {
            warn!("Rejected a change while another one is in flight");
            StoreError::Busy
        })
    }

    /// Replace the in-memory collection with what the backend holds.
    ///
    /// A corrupt payload resets the journal to empty instead of failing.
    pub async fn load_all(&self) -> StoreResult<usize> {
        let _guard = self.begin_mutation()?;
        let records = match self.backend.load().await {
            Ok(records) => records,
            Err(PersistenceError::Corrupt(reason)) => {
                warn!(
                    "Stored series from {} backend were unreadable ({}), starting empty",
                    self.backend.name(),
                    reason
                );
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let count = records.len();
        *self.series.write().await = records;
        info!("Loaded {} series from {} backend", count, self.backend.name());
        Ok(count)
    }

    /// Sanitize, validate and persist a draft as a new series
    pub async fn create(&self, draft: &SeriesDraft) -> StoreResult<SeriesRecord> {
        let _guard = self.begin_mutation()?;
        let details = checked(draft)?;

        let existing = self.series.read().await.clone();
        let record = self.backend.create(&details, Utc::now(), &existing).await?;

        self.series.write().await.push(record.clone());
        info!("Added series '{}' ({})", record.title, record.id);
        Ok(record)
    }

    /// Replace every field of an existing series except its id and creation time
    pub async fn update(&self, id: &str, draft: &SeriesDraft) -> StoreResult<SeriesRecord> {
        let _guard = self.begin_mutation()?;
        let details = checked(draft)?;

        let mut next = self.series.read().await.clone();
        let position = next
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let original = next[position].clone();
        next[position].apply(details);
        let candidate = next[position].clone();

        let mut stored = self
            .backend
            .update(&candidate, &next)
            .await
            .map_err(|e| not_found_or(e, id))?;

        // Identity never changes, whatever the backend echoes back.
        stored.id = original.id;
        stored.created_at = original.created_at;

        if let Some(slot) = self.series.write().await.iter_mut().find(|r| r.id == stored.id) {
            *slot = stored.clone();
        }
        info!("Updated series '{}' ({})", stored.title, stored.id);
        Ok(stored)
    }

    /// Remove a series; an unknown id is reported as [`StoreError::NotFound`]
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.begin_mutation()?;
        let current = self.series.read().await.clone();
        if !current.iter().any(|r| r.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let next: Vec<SeriesRecord> = current.into_iter().filter(|r| r.id != id).collect();

        self.backend
            .delete(id, &next)
            .await
            .map_err(|e| not_found_or(e, id))?;

        self.series.write().await.retain(|r| r.id != id);
        info!("Deleted series {}", id);
        Ok(())
    }

    /// Look a series up in memory, falling back to the backend
    pub async fn get(&self, id: &str) -> StoreResult<SeriesRecord> {
        if let Some(record) = self.series.read().await.iter().find(|r| r.id == id) {
            return Ok(record.clone());
        }
        debug!("Series {} not resident, asking {} backend", id, self.backend.name());
        self.backend
            .fetch(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Replace the whole collection with the built-in sample series
    pub async fn load_sample_data(&self) -> StoreResult<Vec<SeriesRecord>> {
        let _guard = self.begin_mutation()?;
        let details = sample_drafts()
            .iter()
            .map(checked)
            .collect::<StoreResult<Vec<_>>>()?;

        let current = self.series.read().await.clone();
        let records = self
            .backend
            .replace_all(&current, &details, Utc::now())
            .await?;

        *self.series.write().await = records.clone();
        info!("Replaced {} series with {} samples", current.len(), records.len());
        Ok(records)
    }

    /// Delete every series in one backend call; returns how many were removed
    pub async fn clear_all(&self) -> StoreResult<usize> {
        let _guard = self.begin_mutation()?;
        let current = self.series.read().await.clone();
        self.backend.clear(&current).await?;

        self.series.write().await.clear();
        info!("Cleared {} series", current.len());
        Ok(current.len())
    }

    /// Snapshot of the collection in storage order
    pub async fn series(&self) -> Vec<SeriesRecord> {
        self.series.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.series.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.series.read().await.is_empty()
    }

    /// The listing view: filtered and sorted copy of the collection
    pub async fn filtered(&self, query: &SeriesQuery) -> Vec<SeriesRecord> {
        let series = self.series.read().await;
        let view: Vec<SeriesRecord> = filter_and_sort(&series, query).into_iter().cloned().collect();
        debug!("Query {:?} matched {} of {} series", query.search, view.len(), series.len());
        view
    }

    pub async fn statistics(&self) -> SeriesStatistics {
        compute_statistics(&self.series.read().await)
    }
}

/// Sanitize then validate a draft
fn checked(draft: &SeriesDraft) -> StoreResult<SeriesDetails> {
    validate_draft(&sanitize_draft(draft)).map_err(|errors| {
        debug!("Draft rejected: {}", errors);
        StoreError::Validation(errors)
    })
}

fn not_found_or(error: PersistenceError, id: &str) -> StoreError {
    if error.is_not_found() {
        StoreError::NotFound(id.to_string())
    } else {
        StoreError::Persistence(error)
    }
}
