//! Blob storage backends.
//!
//! The status board persists whole JSON objects under hierarchical string
//! keys. Every backend overwrites on `put` with no merge: last writer wins.

mod filesystem;
mod memory;
mod sqlite;

pub use filesystem::FilesystemBlobStore;
pub use memory::MemoryBlobStore;
pub use sqlite::{init_database, SqliteBlobStore};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StorageBackend};
use crate::errors::AppError;

/// Key/value object storage.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Short name used in logs.
    fn backend_tag(&self) -> &'static str;

    /// Fetch an object. Absence is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Store an object, replacing any prior version.
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AppError>;

    /// All keys starting with `prefix`, sorted ascending.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError>;
}

/// Open the backend selected by configuration.
pub async fn open_blob_store(config: &Config) -> Result<Arc<dyn BlobStore>, AppError> {
    let store: Arc<dyn BlobStore> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
        StorageBackend::Filesystem => Arc::new(FilesystemBlobStore::open(&config.blob_dir).await?),
        StorageBackend::Sqlite => {
            let pool = init_database(&config.db_path).await?;
            Arc::new(SqliteBlobStore::new(pool))
        }
    };

    tracing::info!(backend = store.backend_tag(), "Blob storage ready");
    Ok(store)
}
