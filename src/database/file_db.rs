use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use super::backend::{PersistResult, PersistenceError, SeriesBackend};
use crate::catalog::{SeriesDetails, SeriesRecord};

/// Name of the collection file inside the data directory
pub const COLLECTION_FILE: &str = "seriesJournal.json";

/// Local durable storage: the whole collection lives in one JSON array file.
pub struct FileBackend {
    /// Data directory where the collection file is stored
    data_dir: PathBuf,
}

impl FileBackend {
    /// Create a new file backend, creating the data directory if needed
    pub fn new(data_dir: impl AsRef<Path>) -> PersistResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Get the path to the collection file
    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join(COLLECTION_FILE)
    }

    /// Write the whole collection to disk
    fn save_all(&self, records: &[SeriesRecord]) -> PersistResult<()> {
        let path = self.collection_path();
        debug!("Saving {} series to {:?}", records.len(), path);

        // Write to a temporary file first, then atomically rename it over the real one
        let temp_path = path.with_extension("tmp");
        if let Err(e) = write_temp(&temp_path, records) {
            warn!("Failed to write {:?}, keeping the previous journal: {}", temp_path, e);
            if let Err(remove_err) = fs::remove_file(&temp_path) {
                debug!("Could not remove {:?}: {}", temp_path, remove_err);
            }
            return Err(e);
        }
        fs::rename(&temp_path, &path)?;

        info!("Saved {} series to {:?}", records.len(), path);
        Ok(())
    }

    /// Remove an unreadable collection file so the next save starts clean
    fn discard(&self, path: &Path, reason: &str) -> PersistenceError {
        warn!("Discarding unreadable collection file {:?}: {}", path, reason);
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove corrupt collection file {:?}: {}", path, e);
        }
        PersistenceError::Corrupt(reason.to_string())
    }
}

/// Write and sync the temporary file; it is only renamed once this succeeds
fn write_temp(temp_path: &Path, records: &[SeriesRecord]) -> PersistResult<()> {
    let file = write_records(File::create(temp_path)?, records)?;
    file.sync_all()?;
    Ok(())
}

/// Serialize the collection, flushing so that no write error goes unnoticed
fn write_records<W: Write>(inner: W, records: &[SeriesRecord]) -> PersistResult<W> {
    let mut writer = BufWriter::new(inner);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[async_trait]
impl SeriesBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> PersistResult<Vec<SeriesRecord>> {
        let path = self.collection_path();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Collection file not found at {:?}, starting with empty journal", path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loading series from {:?}", path);
        let reader = BufReader::new(file);

        match serde_json::from_reader::<_, Vec<SeriesRecord>>(reader) {
            Ok(records) => {
                info!("Loaded {} series from {:?}", records.len(), path);
                Ok(records)
            }
            Err(e) if e.is_io() => Err(e.into()),
            Err(e) => Err(self.discard(&path, &e.to_string())),
        }
    }

    async fn fetch(&self, _id: &str) -> PersistResult<Option<SeriesRecord>> {
        // The file is loaded in full, so anything not in memory does not exist.
        Ok(None)
    }

    async fn create(
        &self,
        details: &SeriesDetails,
        created_at: DateTime<Utc>,
        existing: &[SeriesRecord],
    ) -> PersistResult<SeriesRecord> {
        let record = SeriesRecord::new(Uuid::new_v4().to_string(), created_at, details.clone());

        let mut next = existing.to_vec();
        next.push(record.clone());
        self.save_all(&next)?;

        Ok(record)
    }

    async fn update(
        &self,
        record: &SeriesRecord,
        next: &[SeriesRecord],
    ) -> PersistResult<SeriesRecord> {
        self.save_all(next)?;
        Ok(record.clone())
    }

    async fn delete(&self, _id: &str, next: &[SeriesRecord]) -> PersistResult<()> {
        self.save_all(next)
    }

    async fn clear(&self, _current: &[SeriesRecord]) -> PersistResult<()> {
        self.save_all(&[])
    }

    async fn replace_all(
        &self,
        _current: &[SeriesRecord],
        details: &[SeriesDetails],
        created_at: DateTime<Utc>,
    ) -> PersistResult<Vec<SeriesRecord>> {
        let records: Vec<SeriesRecord> = details
            .iter()
            .map(|d| SeriesRecord::new(Uuid::new_v4().to_string(), created_at, d.clone()))
            .collect();
        self.save_all(&records)?;
        Ok(records)
    }
}
