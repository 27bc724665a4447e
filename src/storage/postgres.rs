//! PostgreSQL-backed document store: one table of JSONB documents keyed by id.

use crate::storage::{Document, DocumentStore, StoreError};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::marker::PhantomData;

/// A document store over a PostgreSQL connection pool.
pub struct PostgresDocumentStore<T> {
    pool: PgPool,
    table: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresDocumentStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PostgresDocumentStore<T> {
    /// Wraps an existing pool. `table` is spliced into SQL, so it must be a plain identifier.
    pub fn new(pool: PgPool, table: &str) -> Result<Self> {
        if !validate_ident(table) {
            return Err(anyhow::anyhow!("Invalid table name '{}'", table));
        }
        Ok(Self {
            pool,
            table: table.to_string(),
            _marker: PhantomData,
        })
    }

    /// Connects a new pool and makes sure the table exists.
    pub async fn connect(database_url: &str, table: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool, table)?;
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the document table and the patient lookup index if missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                document JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {0}_patient_id_idx ON {0} ((document->>'patientId'))",
            self.table
        ))
        .execute(&self.pool)
        .await?;

        tracing::debug!(table = %self.table, "document table ready");
        Ok(())
    }
}

pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    ident.len() <= 48 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn decode_rows<T: Document>(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            let doc: JsonValue = row.try_get("document")?;
            T::from_document(doc)
        })
        .collect()
}

#[async_trait]
impl<T: Document> DocumentStore<T> for PostgresDocumentStore<T> {
    async fn create(&self, id: &str, doc: &T) -> Result<(), StoreError> {
        let value = doc.to_document()?;
        let sql = format!(
            "INSERT INTO {} (id, document) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<T, StoreError> {
        let sql = format!("SELECT document FROM {} WHERE id = $1", self.table);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        let doc: JsonValue = row.try_get("document")?;
        T::from_document(doc)
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let sql = format!("SELECT document FROM {} ORDER BY id", self.table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        decode_rows(rows)
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<T>, StoreError> {
        let sql = format!(
            "SELECT document FROM {} WHERE document->>$1 = $2 ORDER BY id",
            self.table
        );
        let rows = sqlx::query(&sql)
            .bind(field)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        decode_rows(rows)
    }

    async fn update(&self, id: &str, doc: &T) -> Result<(), StoreError> {
        let value = doc.to_document()?;
        let sql = format!(
            "UPDATE {} SET document = $2, updated_at = now() WHERE id = $1",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
