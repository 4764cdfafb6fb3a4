//! Live-update channel negotiation.
//!
//! The channel itself is not served by this backend. Clients that fail to
//! connect keep polling `/api/status`, so a disabled channel never affects
//! reads or writes.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::AppState;

/// Connection details for the live-update channel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiateResponse {
    pub url: String,
    pub access_token: String,
    pub enabled: bool,
}

/// POST /api/negotiate - Hand out live-update connection info.
pub async fn negotiate(State(state): State<AppState>) -> impl IntoResponse {
    let body = match state.config.live_updates_url.as_deref() {
        Some(url) => NegotiateResponse {
            url: url.to_string(),
            access_token: uuid::Uuid::new_v4().to_string(),
            enabled: true,
        },
        None => NegotiateResponse {
            url: String::new(),
            access_token: String::new(),
            enabled: false,
        },
    };

    (StatusCode::OK, Json(body))
}
