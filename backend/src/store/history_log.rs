//! Append-only, day-partitioned history of status transitions.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::{is_partition_key, partition_key, HistoryEntry, HISTORY_PREFIX};
use crate::storage::BlobStore;

/// Number of entries returned when no limit is requested.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Reads and appends history partitions.
#[derive(Clone)]
pub struct HistoryLog {
    blobs: Arc<dyn BlobStore>,
}

impl HistoryLog {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Append an entry to the partition for its UTC calendar day.
    pub async fn append(&self, entry: &HistoryEntry) -> Result<(), AppError> {
        let date = entry.partition_date();
        let key = partition_key(date);
        let mut partition = self.read_partition(date).await?;
        partition.push(entry.clone());

        let body = serde_json::to_vec_pretty(&partition)
            .map_err(|e| AppError::Storage(format!("Failed to serialize {}: {}", key, e)))?;
        self.blobs.put(&key, body).await?;

        tracing::debug!(
            partition = %key,
            entity_id = %entry.entity_id,
            entries = partition.len(),
            "Appended history entry"
        );
        Ok(())
    }

    /// All entries recorded on one UTC calendar day, in append order.
    pub async fn read_partition(&self, date: NaiveDate) -> Result<Vec<HistoryEntry>, AppError> {
        self.read_key(&partition_key(date)).await
    }

    /// Entries for one entity across every partition, newest first.
    ///
    /// Scans the whole log on every call. Entries sharing a timestamp are
    /// ordered by most recent append first.
    pub async fn query_by_entity(
        &self,
        entity_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        let mut history = Vec::new();

        for key in self.blobs.list(HISTORY_PREFIX).await? {
            if !is_partition_key(&key) {
                continue;
            }
            history.extend(
                self.read_key(&key)
                    .await?
                    .into_iter()
                    .filter(|entry| entry.entity_id == entity_id),
            );
        }

        // Partitions are listed oldest first; reversing before the stable
        // sort puts later appends ahead of earlier ones on equal timestamps.
        history.reverse();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history.truncate(limit);

        Ok(history)
    }

    async fn read_key(&self, key: &str) -> Result<Vec<HistoryEntry>, AppError> {
        match self.blobs.get(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Storage(format!("Malformed history partition {}: {}", key, e))
            }),
            None => Ok(Vec::new()),
        }
    }
}
