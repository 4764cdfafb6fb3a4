//! In-process blob store for tests and demo mode.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BlobStore;
use crate::errors::AppError;

/// Blob store backed by an ordered in-memory map.
///
/// Each instance is independent; nothing is shared between instances.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AppError> {
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
