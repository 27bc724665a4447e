//! Document store contract and its implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("document already exists")]
    Conflict,
    #[error("store transport error: {0}")]
    Transport(String),
    #[error("document (de)serialization failed: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            other => StoreError::Transport(other.to_string()),
        }
    }
}

/// An entity kept in a [`DocumentStore`]: keyed by `id`, persisted as a JSON document.
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn to_document(&self) -> Result<JsonValue, StoreError>;
    fn from_document(doc: JsonValue) -> Result<Self, StoreError>;
}

/// Generic key/document store.
///
/// Listing operations return documents ordered by id.
#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when `id` is taken.
    async fn create(&self, id: &str, doc: &T) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<T, StoreError>;
    async fn find_all(&self) -> Result<Vec<T>, StoreError>;
    /// Exact match on a top-level string field of the stored document.
    async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<T>, StoreError>;
    async fn update(&self, id: &str, doc: &T) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    /// Cheap reachability check for health endpoints.
    async fn ping(&self) -> Result<(), StoreError>;
}
