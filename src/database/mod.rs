//! Persistence for the series journal
//!
//! [`SeriesStore`] owns the in-memory collection. It talks to one
//! [`SeriesBackend`]: either a JSON file on local disk ([`FileBackend`]) or an
//! HTTP service exposing `/series` ([`RemoteBackend`]), selected at start-up
//! by [`manager::connect`].

mod backend;
mod file_db;
pub mod manager;
mod remote;
mod store;

pub use backend::{PersistResult, PersistenceError, SeriesBackend};
pub use file_db::{FileBackend, COLLECTION_FILE};
pub use manager::{connect, open_store};
pub use remote::RemoteBackend;
pub use store::{SeriesStore, StoreError, StoreResult};
