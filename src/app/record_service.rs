//! The PN record service.
//!
//! Sits between the HTTP layer and the document store:
//! 1.  Validates incoming records field by field.
//! 2.  Loads the patient's stored records and runs the consistency engine.
//! 3.  Persists the admitted record, or reports the first violated rule.
//!
//! Create and update hold a per-patient lock from the read to the write, so two
//! requests for one patient in this process cannot both pass against a stale view.
//! An update that moves a record to another patient holds both patients' locks.

use crate::domain::consistency;
use crate::domain::error::RecordError;
use crate::domain::record::{Record, RecordInput};
use crate::storage::DocumentStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Field used to look up a patient's records in the store.
pub const PATIENT_ID_FIELD: &str = "patientId";

type LockMap = HashMap<String, Arc<Mutex<()>>>;

/// Keyed async mutex, one entry per patient id currently held or awaited.
///
/// The map itself sits behind a std mutex: it is only touched for a lookup or
/// a removal and never across an `.await`.
#[derive(Default)]
struct PatientLocks {
    locks: Arc<StdMutex<LockMap>>,
}

/// Holds one patient's lock. The last holder removes the map entry on drop.
struct PatientGuard {
    patient_id: String,
    locks: Arc<StdMutex<LockMap>>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for PatientGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in `_guard`: nobody else holds or waits.
        if locks
            .get(&self.patient_id)
            .is_some_and(|m| Arc::strong_count(m) == 2)
        {
            locks.remove(&self.patient_id);
        }
    }
}

impl PatientLocks {
    async fn lock(&self, patient_id: &str) -> PatientGuard {
        let mutex = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(patient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        PatientGuard {
            patient_id: patient_id.to_string(),
            locks: self.locks.clone(),
            _guard: mutex.lock_owned().await,
        }
    }

    /// Locks several patients in ascending id order so two callers never wait on each other crosswise.
    async fn lock_all(&self, patient_ids: &[&str]) -> Vec<PatientGuard> {
        let mut ids = patient_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock(id).await);
        }
        guards
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct RecordService {
    store: Arc<dyn DocumentStore<Record>>,
    patient_locks: PatientLocks,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore<Record>>) -> Self {
        Self {
            store,
            patient_locks: PatientLocks::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore<Record>> {
        &self.store
    }

    /// Creates a record, assigning a fresh id when the client sent a placeholder.
    pub async fn create(&self, input: RecordInput) -> Result<Record, RecordError> {
        let mut candidate = input.into_record().inspect_err(log_rejection)?;
        if candidate.has_placeholder_id() {
            candidate.id = uuid::Uuid::new_v4().to_string();
        }

        let _guard = self.patient_locks.lock(&candidate.patient_id).await;
        let existing = self.patient_records(&candidate.patient_id).await?;
        let record = consistency::admit_create(candidate, &existing).inspect_err(log_rejection)?;

        self.store
            .create(&record.id, &record)
            .await
            .map_err(|e| store_failure(&record.id, e))?;

        tracing::info!(record_id = %record.id, patient_id = %record.patient_id, "PN record created");
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<Record, RecordError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| store_failure(id, e))
    }

    pub async fn list(&self) -> Result<Vec<Record>, RecordError> {
        self.store.find_all().await.map_err(|e| store_failure("*", e))
    }

    /// Replaces record `path_id` with `input` as a whole.
    ///
    /// When `patientId` changes, the stored patient's history still decides
    /// whether the interval may move, and the new patient's records decide
    /// name and overlap.
    pub async fn update(&self, path_id: &str, input: RecordInput) -> Result<Record, RecordError> {
        let candidate = input.into_record().inspect_err(log_rejection)?;
        consistency::check_identity(path_id, &candidate).inspect_err(log_rejection)?;

        let (_guards, stored) = self.lock_for_update(&candidate).await?;
        let existing = self.patient_records(&candidate.patient_id).await?;
        let admitted = if stored.patient_id == candidate.patient_id {
            consistency::admit_update(candidate, existing)
        } else {
            let previous = self.patient_records(&stored.patient_id).await?;
            consistency::admit_patient_change(candidate, &existing, previous)
        };
        let record = admitted.inspect_err(log_rejection)?;

        self.store
            .update(&record.id, &record)
            .await
            .map_err(|e| store_failure(&record.id, e))?;

        if stored.patient_id != record.patient_id {
            tracing::info!(
                record_id = %record.id,
                from_patient_id = %stored.patient_id,
                patient_id = %record.patient_id,
                "PN record moved to another patient"
            );
        }
        tracing::info!(record_id = %record.id, patient_id = %record.patient_id, "PN record updated");
        Ok(record)
    }

    /// Locks the stored and the requested patient of `candidate.id`.
    ///
    /// The stored record is re-read under the locks; if a concurrent update
    /// moved it meanwhile, the locks are released and taken again.
    async fn lock_for_update(
        &self,
        candidate: &Record,
    ) -> Result<(Vec<PatientGuard>, Record), RecordError> {
        let mut stored = self.get(&candidate.id).await?;
        loop {
            let guards = self
                .patient_locks
                .lock_all(&[stored.patient_id.as_str(), candidate.patient_id.as_str()])
                .await;
            let current = self.get(&candidate.id).await?;
            if current.patient_id == stored.patient_id {
                return Ok((guards, current));
            }
            stored = current;
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), RecordError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| store_failure(id, e))?;
        tracing::info!(record_id = %id, "PN record deleted");
        Ok(())
    }

    async fn patient_records(&self, patient_id: &str) -> Result<Vec<Record>, RecordError> {
        self.store
            .find_by_field(PATIENT_ID_FIELD, patient_id)
            .await
            .map_err(|e| store_failure(patient_id, e))
    }
}

fn store_failure(id: &str, err: crate::storage::StoreError) -> RecordError {
    let err = RecordError::from_store(id, err);
    if let RecordError::Upstream(msg) = &err {
        tracing::error!(id = %id, error = %msg, "record store failure");
    }
    err
}

fn log_rejection(err: &RecordError) {
    tracing::warn!(code = err.code(), reason = %err, "PN record rejected");
}
