//! The current-state document holding every entity's live status.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Entity, EntityType};
use crate::errors::AppError;

/// All departments and cells, persisted and rewritten as one unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentStateDocument {
    #[serde(default)]
    pub departments: Vec<Entity>,
    #[serde(default)]
    pub cells: Vec<Entity>,
}

impl CurrentStateDocument {
    /// Parse a persisted document, rejecting malformed data.
    ///
    /// Unknown status values, missing required fields and duplicate ids within
    /// a collection are all storage errors.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        let doc: Self = serde_json::from_slice(bytes).map_err(|e| {
            AppError::Storage(format!("Malformed current-state document: {}", e))
        })?;

        for entity_type in [EntityType::Department, EntityType::Cell] {
            let mut seen = HashSet::new();
            for entity in doc.collection(entity_type) {
                if !seen.insert(entity.id.as_str()) {
                    return Err(AppError::Storage(format!(
                        "Malformed current-state document: duplicate {} id {}",
                        entity_type.as_str(),
                        entity.id
                    )));
                }
            }
        }

        Ok(doc)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, AppError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| AppError::Storage(format!("Failed to serialize document: {}", e)))
    }

    pub fn collection(&self, entity_type: EntityType) -> &[Entity] {
        match entity_type {
            EntityType::Department => &self.departments,
            EntityType::Cell => &self.cells,
        }
    }

    fn collection_mut(&mut self, entity_type: EntityType) -> &mut Vec<Entity> {
        match entity_type {
            EntityType::Department => &mut self.departments,
            EntityType::Cell => &mut self.cells,
        }
    }

    pub fn find_entity(&self, entity_type: EntityType, id: &str) -> Option<&Entity> {
        self.collection(entity_type).iter().find(|e| e.id == id)
    }

    pub fn find_entity_mut(&mut self, entity_type: EntityType, id: &str) -> Option<&mut Entity> {
        self.collection_mut(entity_type)
            .iter_mut()
            .find(|e| e.id == id)
    }

    /// Replace the entity with a matching id, or append it.
    pub fn upsert_entity(&mut self, entity_type: EntityType, entity: Entity) {
        let collection = self.collection_mut(entity_type);
        match collection.iter().position(|e| e.id == entity.id) {
            Some(index) => collection[index] = entity,
            None => collection.push(entity),
        }
    }

    /// Remove the entity with a matching id. Returns whether anything was removed.
    pub fn remove_entity(&mut self, entity_type: EntityType, id: &str) -> bool {
        let collection = self.collection_mut(entity_type);
        let before = collection.len();
        collection.retain(|e| e.id != id);
        collection.len() != before
    }
}
