use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::core::config::{BackendKind, Config};
use crate::database::{FileBackend, RemoteBackend, SeriesBackend, SeriesStore};

/// Build the persistence binding selected by the configuration
pub fn connect(config: &Config) -> Result<Arc<dyn SeriesBackend>> {
    match config.storage.backend {
        BackendKind::File => {
            info!(
                "Using file-based storage in data directory: {}",
                config.storage.data_dir
            );
            let backend = FileBackend::new(&config.storage.data_dir).with_context(|| {
                format!("Failed to open data directory {}", config.storage.data_dir)
            })?;
            Ok(Arc::new(backend))
        }
        BackendKind::Remote => {
            info!("Using remote series service at {}", config.remote.base_url);
            let backend = RemoteBackend::from_config(&config.remote)
                .context("Failed to create HTTP client for the series service")?;
            Ok(Arc::new(backend))
        }
    }
}

/// Connect to the configured backend and load the journal
pub async fn open_store(config: &Config) -> Result<SeriesStore> {
    let backend = connect(config)?;
    let store = SeriesStore::open(backend)
        .await
        .context("Failed to load the series journal")?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RemoteConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_backend_selected_by_default() {
        let dir = tempdir().unwrap();
        let config = Config::for_data_dir(dir.path().join("nested").to_string_lossy());

        let store = open_store(&config).await.unwrap();
        assert!(store.is_empty().await);
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_remote_backend_selected() {
        let mut config = Config::default();
        config.storage.backend = BackendKind::Remote;
        config.remote = RemoteConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 1,
        };

        let backend = connect(&config).unwrap();
        assert_eq!(backend.name(), "remote");
    }
}
