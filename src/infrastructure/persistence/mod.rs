//! # Persistence Layer
//!
//! Repository ports and the backends that implement them.
//!
//! ## Repository Traits (Ports)
//!
//! - [`Repository`]: Per-kind list, get, create, update and delete
//! - [`RecordStore`]: All four kinds behind one handle
//!
//! ## Implementations
//!
//! - `json_file`: One JSON array file per kind, rewritten atomically
//! - `sqlite`: One table per kind via sqlx
//!
//! [`seed`] loads demo data into an empty store.

pub mod json_file;
pub mod seed;
pub mod sqlite;
pub mod traits;

pub use json_file::JsonFileStore;
pub use seed::{SeedReport, seed_if_empty};
pub use sqlite::SqliteStore;
pub use traits::{NamedBackend, RecordStore, Repository, RepositoryError, RepositoryResult};

use crate::config::{StorageBackend, StorageSettings};
use std::sync::Arc;

/// Opens the backend selected by `settings`.
///
/// # Errors
///
/// Returns whatever the selected backend's constructor returns.
pub async fn open_store(settings: &StorageSettings) -> RepositoryResult<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match settings.backend {
        StorageBackend::Json => Arc::new(JsonFileStore::open(&settings.data_dir).await?),
        StorageBackend::Sqlite => Arc::new(
            SqliteStore::connect(&settings.database_url, settings.max_connections).await?,
        ),
    };
    Ok(store)
}
