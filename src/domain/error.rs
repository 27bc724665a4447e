use crate::domain::date::DateError;
use crate::storage::StoreError;

/// Why a create/update/read/delete request was not carried out.
///
/// Domain rejections come first; the store-originated variants close the list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{field}: {source}")]
    Date {
        field: String,
        #[source]
        source: DateError,
    },
    #[error("{field} {message}")]
    FieldValidation { field: String, message: String },
    #[error("{0}")]
    DateOrder(String),
    #[error("full name is required for a patient without previous records")]
    NameRequired,
    #[error("full name does not match previous records of patient {patient_id}")]
    NameConflict { patient_id: String },
    #[error("validity interval overlaps record {conflicting_id}")]
    IntervalOverlap { conflicting_id: String },
    #[error("validity interval of a record that is not the latest one cannot be changed")]
    HistoricalIntervalImmutable,
    #[error("record id in path ({path_id}) does not match id in body ({body_id})")]
    IdentityMismatch { path_id: String, body_id: String },
    #[error("record {0} not found")]
    NotFound(String),
    #[error("record {0} already exists")]
    Conflict(String),
    #[error("record store failure: {0}")]
    Upstream(String),
}

impl RecordError {
    /// Stable machine-readable code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::Date { source, .. } => match source {
                DateError::InvalidFormat(_) => "INVALID_FORMAT",
                DateError::OutOfRange(_) => "OUT_OF_RANGE",
            },
            RecordError::FieldValidation { .. } => "FIELD_VALIDATION",
            RecordError::DateOrder(_) => "DATE_ORDER",
            RecordError::NameRequired => "NAME_REQUIRED",
            RecordError::NameConflict { .. } => "NAME_CONFLICT",
            RecordError::IntervalOverlap { .. } => "INTERVAL_OVERLAP",
            RecordError::HistoricalIntervalImmutable => "HISTORICAL_INTERVAL_IMMUTABLE",
            RecordError::IdentityMismatch { .. } => "IDENTITY_MISMATCH",
            RecordError::NotFound(_) => "NOT_FOUND",
            RecordError::Conflict(_) => "CONFLICT",
            RecordError::Upstream(_) => "UPSTREAM_FAILURE",
        }
    }

    /// Lifts a store error for the record `id` into the request taxonomy.
    pub fn from_store(id: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => RecordError::NotFound(id.to_string()),
            StoreError::Conflict => RecordError::Conflict(id.to_string()),
            other => RecordError::Upstream(other.to_string()),
        }
    }
}
