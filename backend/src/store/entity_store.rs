//! Current-state document persistence.

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::CurrentStateDocument;
use crate::storage::BlobStore;

/// Storage key of the current-state document.
pub const CURRENT_STATE_KEY: &str = "current-status.json";

/// Loads and saves the current-state document as a single object.
#[derive(Clone)]
pub struct EntityStore {
    blobs: Arc<dyn BlobStore>,
}

impl EntityStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Fetch the persisted document, or an empty one if none exists yet.
    pub async fn load(&self) -> Result<CurrentStateDocument, AppError> {
        match self.blobs.get(CURRENT_STATE_KEY).await? {
            Some(bytes) => CurrentStateDocument::from_json(&bytes),
            None => Ok(CurrentStateDocument::default()),
        }
    }

    /// Whether a document has ever been saved.
    pub async fn exists(&self) -> Result<bool, AppError> {
        Ok(self.blobs.get(CURRENT_STATE_KEY).await?.is_some())
    }

    /// Overwrite the persisted document. Last writer wins.
    pub async fn save(&self, doc: &CurrentStateDocument) -> Result<(), AppError> {
        self.blobs.put(CURRENT_STATE_KEY, doc.to_json()?).await
    }
}
