use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{SeriesDetails, SeriesRecord};

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistenceError>;

/// Error type for persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Remote service answered {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Malformed response from remote service: {0}")]
    MalformedResponse(String),

    #[error("Invalid remote base URL: {0}")]
    InvalidBaseUrl(String),

    /// The id cannot name a resource, so nothing can be stored under it.
    #[error("Series id {0:?} cannot be addressed")]
    UnaddressableId(String),

    /// The stored collection could not be read back. Only produced by `load`.
    #[error("Persisted collection is corrupt: {0}")]
    Corrupt(String),
}

impl PersistenceError {
    /// Whether the backend reported the addressed record as absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PersistenceError::UnexpectedStatus { status: 404, .. }
                | PersistenceError::UnaddressableId(_)
        )
    }
}

/// The persistence collaborator behind a [`SeriesStore`](super::SeriesStore).
///
/// Snapshot-style backends (a local file) receive the full collection as it
/// will look after the mutation; record-style backends (an HTTP service) only
/// need the record itself. Either way the store commits its in-memory copy
/// only after the call returns `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesBackend: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Read the whole collection
    async fn load(&self) -> PersistResult<Vec<SeriesRecord>>;

    /// Read one record that is not resident in memory
    async fn fetch(&self, id: &str) -> PersistResult<Option<SeriesRecord>>;

    /// Store a new record; the backend assigns its id
    async fn create(
        &self,
        details: &SeriesDetails,
        created_at: DateTime<Utc>,
        existing: &[SeriesRecord],
    ) -> PersistResult<SeriesRecord>;

    /// Replace a stored record; `next` is the collection including `record`
    async fn update(
        &self,
        record: &SeriesRecord,
        next: &[SeriesRecord],
    ) -> PersistResult<SeriesRecord>;

    /// Remove a stored record; `next` is the collection without it
    async fn delete(&self, id: &str, next: &[SeriesRecord]) -> PersistResult<()>;

    /// Remove every stored record; `current` is the collection being dropped
    async fn clear(&self, current: &[SeriesRecord]) -> PersistResult<()>;

    /// Make `details` the whole collection, replacing `current`
    async fn replace_all(
        &self,
        current: &[SeriesRecord],
        details: &[SeriesDetails],
        created_at: DateTime<Utc>,
    ) -> PersistResult<Vec<SeriesRecord>>;
}
