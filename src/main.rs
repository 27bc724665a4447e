//! PN registry API server.

use pn_registry::infra::{config::Config, logging};
use pn_registry::storage::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};
use pn_registry::{transport, Record, RecordService};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(config.environment)?;

    // --- Store Initialization ---
    let store: Arc<dyn DocumentStore<Record>> = match &config.database_url {
        Some(url) => {
            tracing::info!(collection = %config.collection, "connecting to PostgreSQL record store");
            Arc::new(
                PostgresDocumentStore::<Record>::connect(
                    url,
                    &config.collection,
                    config.max_connections,
                )
                .await?,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; records are kept in memory only");
            Arc::new(InMemoryDocumentStore::<Record>::new())
        }
    };

    let app_state = transport::http::AppState {
        record_service: Arc::new(RecordService::new(store)),
    };

    // --- API Server Initialization ---
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(transport::http::cors_layer());

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, production = config.environment.is_production(), "PN registry API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await?;

    Ok(())
}
