//! History API endpoints.

use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{query_params, success, ApiResult};
use crate::models::HistoryEntry;
use crate::store::DEFAULT_HISTORY_LIMIT;
use crate::AppState;

/// History query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Raw limit; missing, non-numeric or zero values fall back to the default.
    #[serde(default)]
    pub limit: Option<String>,
}

impl HistoryQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryPayload {
    pub history: Vec<HistoryEntry>,
}

/// GET /api/history/{entity_id} - Status transitions for one entity, newest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
    params: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<HistoryPayload> {
    let params = query_params(params)?;
    let history = state
        .service
        .get_history(&entity_id, params.effective_limit())
        .await?;

    success(HistoryPayload { history })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>) -> HistoryQuery {
        HistoryQuery {
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(query(None).effective_limit(), 50);
        assert_eq!(query(Some("2")).effective_limit(), 2);
        assert_eq!(query(Some("0")).effective_limit(), 50);
        assert_eq!(query(Some("ten")).effective_limit(), 50);
        assert_eq!(query(Some("-3")).effective_limit(), 50);
        assert_eq!(query(Some("1000")).effective_limit(), 1000);
    }
}
