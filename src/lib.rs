pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::record_service::RecordService;
pub use domain::{Date, Reason, Record, RecordError, RecordInput};
pub use infra::config::Config;
pub use storage::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};
