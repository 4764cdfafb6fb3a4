//! Status service orchestrating the entity store and the history log.
//!
//! Each mutation is one load-mutate-save of the current-state document plus,
//! for updates and creations, one history append. The two writes are not
//! atomic: a crash between them leaves one without the other.
//!
//! Mutations within this process are serialized by a single write lock, so
//! concurrent requests cannot overwrite each other's changes. Processes
//! sharing the same storage still race with last-writer-wins semantics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::{
    derive_entity_id, CreateEntityRequest, CurrentStateDocument, DeleteEntityRequest, Entity,
    EntityType, HistoryEntry, Status, UpdateStatusRequest,
};
use crate::storage::BlobStore;
use crate::store::{EntityStore, HistoryLog};

/// Result of a successful creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntity {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Entry point for every status read and mutation.
pub struct StatusService {
    entities: EntityStore,
    history: HistoryLog,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl StatusService {
    pub fn new(blobs: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entities: EntityStore::new(blobs.clone()),
            history: HistoryLog::new(blobs),
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn entity_store(&self) -> &EntityStore {
        &self.entities
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current departments and cells.
    pub async fn get_status(&self) -> Result<CurrentStateDocument, AppError> {
        self.entities.load().await
    }

    /// Set an entity's status and note, creating the entity if it does not exist.
    ///
    /// Returns the mutation timestamp, which is also the entity's new `lastUpdate`.
    pub async fn update_status(
        &self,
        request: UpdateStatusRequest,
    ) -> Result<DateTime<Utc>, AppError> {
        let entity_type = parse_entity_type(request.entity_type.as_deref())?;
        let entity_id = required(request.entity_id.as_deref(), "entityId")?.to_string();
        let status = parse_status(request.status.as_deref())?;
        let update_note = request.update_note.unwrap_or_default();

        let _guard = self.write_lock.lock().await;
        let mut doc = self.entities.load().await?;
        let now = self.clock.now();

        let entry = match doc.find_entity_mut(entity_type, &entity_id) {
            Some(entity) => {
                let previous_status = entity.status;
                // never move lastUpdate backwards, even if the clock does
                let timestamp = now.max(entity.last_update);
                entity.status = status;
                entity.update_note = update_note.clone();
                entity.last_update = timestamp;

                HistoryEntry {
                    timestamp,
                    entity_type,
                    entity_id: entity_id.clone(),
                    entity_name: entity.name.clone(),
                    status,
                    update_note,
                    previous_status: Some(previous_status),
                }
            }
            None => {
                let name = request
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(entity_id.as_str())
                    .to_string();
                doc.upsert_entity(
                    entity_type,
                    Entity {
                        id: entity_id.clone(),
                        name: name.clone(),
                        status,
                        update_note: update_note.clone(),
                        last_update: now,
                    },
                );

                HistoryEntry {
                    timestamp: now,
                    entity_type,
                    entity_id: entity_id.clone(),
                    entity_name: name,
                    status,
                    update_note,
                    previous_status: None,
                }
            }
        };

        self.history.append(&entry).await?;
        self.entities.save(&doc).await?;

        tracing::info!(
            entity_type = entity_type.as_str(),
            entity_id = %entity_id,
            status = status.as_str(),
            previous_status = entry.previous_status.map(|s| s.as_str()),
            "Status updated"
        );
        Ok(entry.timestamp)
    }

    /// Create a new entity whose id is derived from its name.
    pub async fn create_entity(
        &self,
        request: CreateEntityRequest,
    ) -> Result<CreatedEntity, AppError> {
        let entity_type = parse_entity_type(request.entity_type.as_deref())?;
        let name = required(request.name.as_deref(), "name")?.to_string();
        let status = parse_status(request.status.as_deref())?;
        let update_note = request.update_note.unwrap_or_default();
        let entity_id = derive_entity_id(&name);

        let _guard = self.write_lock.lock().await;
        let mut doc = self.entities.load().await?;

        if doc.find_entity(entity_type, &entity_id).is_some() {
            return Err(AppError::Conflict(format!(
                "Entity with this name already exists: {}",
                entity_id
            )));
        }

        let timestamp = self.clock.now();
        doc.upsert_entity(
            entity_type,
            Entity {
                id: entity_id.clone(),
                name: name.clone(),
                status,
                update_note: update_note.clone(),
                last_update: timestamp,
            },
        );

        self.history
            .append(&HistoryEntry {
                timestamp,
                entity_type,
                entity_id: entity_id.clone(),
                entity_name: name,
                status,
                update_note,
                previous_status: None,
            })
            .await?;
        self.entities.save(&doc).await?;

        tracing::info!(
            entity_type = entity_type.as_str(),
            entity_id = %entity_id,
            status = status.as_str(),
            "Entity created"
        );
        Ok(CreatedEntity {
            entity_id,
            timestamp,
        })
    }

    /// Remove an entity from the current state.
    ///
    /// History is retained and no deletion event is recorded.
    pub async fn delete_entity(&self, request: DeleteEntityRequest) -> Result<(), AppError> {
        let entity_type = parse_entity_type(request.entity_type.as_deref())?;
        let entity_id = required(request.entity_id.as_deref(), "entityId")?;

        let _guard = self.write_lock.lock().await;
        let mut doc = self.entities.load().await?;

        if !doc.remove_entity(entity_type, entity_id) {
            return Err(AppError::NotFound(format!(
                "{} {} not found",
                entity_type.as_str(),
                entity_id
            )));
        }

        self.entities.save(&doc).await?;

        tracing::info!(
            entity_type = entity_type.as_str(),
            entity_id = %entity_id,
            "Entity deleted"
        );
        Ok(())
    }

    /// History for one entity, newest first.
    pub async fn get_history(
        &self,
        entity_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        self.history.query_by_entity(entity_id, limit).await
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!(
            "Missing required field: {}",
            field
        ))),
    }
}

fn parse_entity_type(value: Option<&str>) -> Result<EntityType, AppError> {
    let raw = required(value, "entityType")?;
    EntityType::parse(raw)
        .ok_or_else(|| AppError::Validation(format!("Unknown entityType: {}", raw)))
}

fn parse_status(value: Option<&str>) -> Result<Status, AppError> {
    let raw = required(value, "status")?;
    Status::parse(raw).ok_or_else(|| AppError::Validation(format!("Unknown status: {}", raw)))
}

#[cfg(test)]
mod tests;
