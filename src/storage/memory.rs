//! Process-local document store, used when no database is configured and in tests.

use crate::storage::{Document, DocumentStore, StoreError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;

/// Keeps documents in their persisted JSON form, so reads go through the same
/// conversion as the database-backed store.
pub struct InMemoryDocumentStore<T> {
    docs: RwLock<BTreeMap<String, JsonValue>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InMemoryDocumentStore<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for InMemoryDocumentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for InMemoryDocumentStore<T> {
    async fn create(&self, id: &str, doc: &T) -> Result<(), StoreError> {
        let value = doc.to_document()?;
        let mut docs = self.docs.write().await;
        if docs.contains_key(id) {
            return Err(StoreError::Conflict);
        }
        docs.insert(id.to_string(), value);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<T, StoreError> {
        let docs = self.docs.read().await;
        let value = docs.get(id).cloned().ok_or(StoreError::NotFound)?;
        T::from_document(value)
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().await;
        docs.values().cloned().map(T::from_document).collect()
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().await;
        docs.values()
            .filter(|doc| doc.get(field).and_then(JsonValue::as_str) == Some(value))
            .cloned()
            .map(T::from_document)
            .collect()
    }

    async fn update(&self, id: &str, doc: &T) -> Result<(), StoreError> {
        let value = doc.to_document()?;
        let mut docs = self.docs.write().await;
        match docs.get_mut(id) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RecordInput;
    use crate::domain::Record;
    use serde_json::json;

    fn record(id: &str, patient_id: &str) -> Record {
        let input: RecordInput = serde_json::from_value(json!({
            "id": id,
            "fullName": "Jane Doe",
            "patientId": patient_id,
            "employer": "ACME",
            "reason": "quarantine",
            "issued": "2024-01-10",
            "validFrom": "2024-01-10",
            "validUntil": "2024-01-20",
            "checkUp": "2024-01-18"
        }))
        .unwrap();
        input.into_record().unwrap()
    }

    #[tokio::test]
    async fn crud_contract() {
        let store = InMemoryDocumentStore::<Record>::new();
        let a = record("a", "123");

        store.create("a", &a).await.unwrap();
        assert_eq!(store.create("a", &a).await, Err(StoreError::Conflict));
        assert_eq!(store.find_by_id("a").await.unwrap(), a);
        assert_eq!(store.find_by_id("zz").await, Err(StoreError::NotFound));

        let mut changed = a.clone();
        changed.check_up_done = true;
        store.update("a", &changed).await.unwrap();
        assert!(store.find_by_id("a").await.unwrap().check_up_done);
        assert_eq!(store.update("zz", &changed).await, Err(StoreError::NotFound));

        store.delete("a").await.unwrap();
        assert_eq!(store.delete("a").await, Err(StoreError::NotFound));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_field_matches_exactly_and_orders_by_id() {
        let store = InMemoryDocumentStore::<Record>::new();
        for (id, pid) in [("c", "123"), ("a", "123"), ("b", "1234")] {
            store.create(id, &record(id, pid)).await.unwrap();
        }

        let ids: Vec<String> = store
            .find_by_field("patientId", "123")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }
}
