use crate::app::record_service::RecordService;
use crate::domain::error::RecordError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub record_service: Arc<RecordService>,
}

/// Body of every non-2xx response.
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    /// HTTP reason phrase, e.g. `Conflict`.
    pub status: String,
    pub message: String,
    /// Machine-readable code, e.g. `INTERVAL_OVERLAP`.
    pub error: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// A failed request, ready to be rendered.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.to_string(),
        }
    }
}

pub fn status_for(err: &RecordError) -> StatusCode {
    match err {
        RecordError::Date { .. }
        | RecordError::FieldValidation { .. }
        | RecordError::DateOrder(_)
        | RecordError::IdentityMismatch { .. }
        | RecordError::HistoricalIntervalImmutable => StatusCode::BAD_REQUEST,
        RecordError::NameRequired | RecordError::NotFound(_) => StatusCode::NOT_FOUND,
        RecordError::NameConflict { .. }
        | RecordError::IntervalOverlap { .. }
        | RecordError::Conflict(_) => StatusCode::CONFLICT,
        RecordError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::new(status_for(&err), err.code(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_BODY",
            format!("Invalid request body: {}", err.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: self.message,
            error: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}
