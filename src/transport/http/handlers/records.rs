use crate::domain::record::{Record, RecordInput};
use crate::transport::http::types::{ApiError, AppState, ErrorResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/records",
    request_body = RecordInput,
    responses(
        (status = 201, description = "PN record created", body = Record),
        (status = 400, description = "Invalid field, date or date order", body = ErrorResponse),
        (status = 404, description = "Full name required for a new patient", body = ErrorResponse),
        (status = 409, description = "Name mismatch, interval overlap or duplicate id", body = ErrorResponse),
        (status = 502, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn create_record_handler(
    State(state): State<AppState>,
    request: Result<Json<RecordInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = request?;
    let record = state.record_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "All PN records", body = Vec<Record>),
        (status = 502, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn list_records_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(state.record_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/records/{recordId}",
    params(
        ("recordId" = String, Path, description = "PN record id")
    ),
    responses(
        (status = 200, description = "The PN record", body = Record),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 502, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn get_record_handler(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    Ok(Json(state.record_service.get(&record_id).await?))
}

#[utoipa::path(
    put,
    path = "/records/{recordId}",
    params(
        ("recordId" = String, Path, description = "PN record id; must equal the id in the body")
    ),
    request_body = RecordInput,
    responses(
        (status = 200, description = "PN record replaced", body = Record),
        (status = 400, description = "Invalid field, date order, id mismatch or historical interval change", body = ErrorResponse),
        (status = 404, description = "Record not found, or full name required", body = ErrorResponse),
        (status = 409, description = "Name mismatch or interval overlap", body = ErrorResponse),
        (status = 502, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn update_record_handler(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    request: Result<Json<RecordInput>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    let Json(input) = request?;
    Ok(Json(state.record_service.update(&record_id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/records/{recordId}",
    params(
        ("recordId" = String, Path, description = "PN record id")
    ),
    responses(
        (status = 204, description = "PN record deleted"),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 502, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn delete_record_handler(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.record_service.delete(&record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
