//! History entry model and day-partition keys.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityType, Status};

/// Key prefix shared by every history partition.
pub const HISTORY_PREFIX: &str = "history/";

/// Object name of a single day's partition within its date directory.
pub const PARTITION_SUFFIX: &str = "/updates.json";

/// Immutable record of one status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub entity_name: String,
    pub status: Status,
    #[serde(default)]
    pub update_note: String,
    /// `None` for creation events; serialized as an explicit `null`.
    pub previous_status: Option<Status>,
}

impl HistoryEntry {
    /// UTC calendar day this entry belongs to.
    pub fn partition_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Storage key of the partition for a UTC calendar day.
pub fn partition_key(date: NaiveDate) -> String {
    format!(
        "{}{:04}/{:02}/{:02}{}",
        HISTORY_PREFIX,
        date.year(),
        date.month(),
        date.day(),
        PARTITION_SUFFIX
    )
}

/// Whether a storage key names a history partition.
pub fn is_partition_key(key: &str) -> bool {
    key.starts_with(HISTORY_PREFIX) && key.ends_with(PARTITION_SUFFIX)
}
