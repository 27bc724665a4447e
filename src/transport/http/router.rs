use crate::domain::record::{Reason, Record, RecordInput};
use crate::transport::http::handlers::{health, records};
use crate::transport::http::types::{AppState, ErrorResponse, HealthResponse};
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "PN registry API", description = "Sick-leave (PN) certificate records"),
    paths(
        health::healthcheck_handler,
        records::create_record_handler,
        records::list_records_handler,
        records::get_record_handler,
        records::update_record_handler,
        records::delete_record_handler
    ),
    components(schemas(Record, RecordInput, Reason, ErrorResponse, HealthResponse))
)]
pub struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/openapi", get(openapi_handler))
        .route(
            "/records",
            get(records::list_records_handler).post(records::create_record_handler),
        )
        .route(
            "/records/:record_id",
            get(records::get_record_handler)
                .put(records::update_record_handler)
                .delete(records::delete_record_handler),
        )
        .with_state(app_state)
}

/// Any origin; the methods and headers browser clients of the registry use.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::ORIGIN, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(false)
        .max_age(Duration::from_secs(12 * 60 * 60))
}
