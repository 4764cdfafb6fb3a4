//! Entity model matching the dashboard's department and cell cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current status of an entity, transmitted as the dashboard's display strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Status {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Delayed")]
    Delayed,
    #[serde(rename = "Emergency")]
    Emergency,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::OnTrack => "On Track",
            Status::AtRisk => "At Risk",
            Status::Delayed => "Delayed",
            Status::Emergency => "Emergency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "On Track" => Some(Status::OnTrack),
            "At Risk" => Some(Status::AtRisk),
            "Delayed" => Some(Status::Delayed),
            "Emergency" => Some(Status::Emergency),
            _ => None,
        }
    }
}

/// Which collection of the current-state document an entity lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Department,
    Cell,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Department => "department",
            EntityType::Cell => "cell",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "department" => Some(EntityType::Department),
            "cell" => Some(EntityType::Cell),
            _ => None,
        }
    }
}

/// A department or cell tracked by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub update_note: String,
    pub last_update: DateTime<Utc>,
}

/// Derive a stable entity id from a display name.
///
/// Lower-cases the name and collapses every run of non-alphanumeric
/// characters into a single `_`, so `"My Dept!"` becomes `"my_dept_"`.
pub fn derive_entity_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            id.push(c);
            in_separator = false;
        } else if !in_separator {
            id.push('_');
            in_separator = true;
        }
    }

    id
}

/// Request body for `POST /api/status/update`.
///
/// Fields are optional so that missing values surface as validation errors
/// rather than body rejections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub update_note: Option<String>,
}

/// Request body for `POST /api/status/create`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityRequest {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub update_note: Option<String>,
}

/// Request body for `DELETE /api/status/delete`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntityRequest {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
}
