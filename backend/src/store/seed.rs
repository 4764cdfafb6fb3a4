//! Demo data for local runs.

use chrono::{DateTime, Utc};

use super::EntityStore;
use crate::errors::AppError;
use crate::models::{derive_entity_id, CurrentStateDocument, Entity, EntityType, Status};

const DEMO_DEPARTMENTS: &[(&str, Status, &str)] = &[
    ("Accounting", Status::OnTrack, "No Update."),
    ("BIZ", Status::AtRisk, "We've re-opened BIZ and are monitoring the app"),
    ("Ecom", Status::OnTrack, "Ecom is currently queuing orders."),
    ("Customer Relations", Status::OnTrack, "No Update."),
    ("Credit", Status::OnTrack, "No Update."),
    ("Export", Status::OnTrack, "No Update."),
    ("IT", Status::OnTrack, "No Update."),
    (
        "Inventory/WM",
        Status::Delayed,
        "Tracking down issues related to inventory processes",
    ),
];

const DEMO_CELLS: &[(&str, Status, &str)] = &[
    ("Project Alpha", Status::OnTrack, "Progress on schedule"),
    ("Project Beta", Status::AtRisk, "Resource constraints causing delays"),
    (
        "Project Gamma",
        Status::Emergency,
        "Critical issue requires immediate attention",
    ),
];

/// Build the demo document with every entity stamped at `now`.
pub fn demo_document(now: DateTime<Utc>) -> CurrentStateDocument {
    let mut doc = CurrentStateDocument::default();
    for (entity_type, rows) in [
        (EntityType::Department, DEMO_DEPARTMENTS),
        (EntityType::Cell, DEMO_CELLS),
    ] {
        for (name, status, note) in rows {
            doc.upsert_entity(
                entity_type,
                Entity {
                    id: derive_entity_id(name),
                    name: name.to_string(),
                    status: *status,
                    update_note: note.to_string(),
                    last_update: now,
                },
            );
        }
    }
    doc
}

/// Save the demo document unless a document already exists.
///
/// Returns whether seeding happened.
pub async fn seed_if_empty(store: &EntityStore, now: DateTime<Utc>) -> Result<bool, AppError> {
    if store.exists().await? {
        return Ok(false);
    }
    store.save(&demo_document(now)).await?;
    Ok(true)
}
