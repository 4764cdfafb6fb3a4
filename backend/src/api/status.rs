//! Status API endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{json_body, success, ApiResult, Empty};
use crate::models::{CreateEntityRequest, DeleteEntityRequest, Entity, UpdateStatusRequest};
use crate::service::CreatedEntity;
use crate::AppState;

/// Both collections, keyed the way the dashboard expects.
#[derive(Debug, Serialize)]
pub struct Sheets {
    #[serde(rename = "DepartmentStatus")]
    pub department_status: Vec<Entity>,
    #[serde(rename = "CellStatus")]
    pub cell_status: Vec<Entity>,
}

#[derive(Debug, Serialize)]
pub struct StatusPayload {
    pub sheets: Sheets,
}

#[derive(Debug, Serialize)]
pub struct TimestampPayload {
    pub timestamp: DateTime<Utc>,
}

/// GET /api/status - Current status of every department and cell.
pub async fn get_status(State(state): State<AppState>) -> ApiResult<StatusPayload> {
    let doc = state.service.get_status().await?;

    success(StatusPayload {
        sheets: Sheets {
            department_status: doc.departments,
            cell_status: doc.cells,
        },
    })
}

/// POST /api/status/update - Set an entity's status, creating it if needed.
pub async fn update_status(
    State(state): State<AppState>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<TimestampPayload> {
    let request = json_body(payload)?;
    let timestamp = state.service.update_status(request).await?;

    success(TimestampPayload { timestamp })
}

/// POST /api/status/create - Create an entity with an id derived from its name.
pub async fn create_entity(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntityRequest>, JsonRejection>,
) -> ApiResult<CreatedEntity> {
    let request = json_body(payload)?;
    let created = state.service.create_entity(request).await?;

    success(created)
}

/// DELETE /api/status/delete - Remove an entity; its history is kept.
pub async fn delete_entity(
    State(state): State<AppState>,
    payload: Result<Json<DeleteEntityRequest>, JsonRejection>,
) -> ApiResult<Empty> {
    let request = json_body(payload)?;
    state.service.delete_entity(request).await?;

    success(Empty {})
}
