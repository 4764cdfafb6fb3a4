//! REST API module.
//!
//! Contains all API routes and handlers following the dashboard front end's contract.

mod history;
mod negotiate;
mod status;

pub use history::*;
pub use negotiate::*;
pub use status::*;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
///
/// The payload's fields sit next to `success` rather than under a `data` key.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Payload for responses that carry nothing beyond `success`.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Unwrap a JSON body, turning extractor rejections into the standard error envelope.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap query parameters, turning extractor rejections into the standard error envelope.
pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
