//! The PN record (sick-leave certificate) and its wire/persisted forms.

use crate::domain::date::{self, Date};
use crate::domain::error::RecordError;
use crate::domain::validation;
use crate::storage::{Document, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use utoipa::ToSchema;

/// Identifier a client sends to ask the server to assign a fresh id.
pub const NEW_RECORD_PLACEHOLDER: &str = "@new";

/// Reason a certificate was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    #[serde(alias = "choroba")]
    Sickness,
    #[serde(alias = "uraz")]
    Injury,
    #[serde(alias = "choroba-z-povolania")]
    OccupationalDisease,
    #[serde(alias = "karantenne-opatrenie-izolacia")]
    Quarantine,
    #[serde(alias = "pracovny-uraz")]
    WorkInjury,
    #[serde(alias = "ine")]
    Other,
}

impl Reason {
    pub const ALL: [Reason; 6] = [
        Reason::Sickness,
        Reason::Injury,
        Reason::OccupationalDisease,
        Reason::Quarantine,
        Reason::WorkInjury,
        Reason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Sickness => "sickness",
            Reason::Injury => "injury",
            Reason::OccupationalDisease => "occupational-disease",
            Reason::Quarantine => "quarantine",
            Reason::WorkInjury => "work-injury",
            Reason::Other => "other",
        }
    }

    /// Legacy codes still found in older clients and seeded data.
    fn legacy_code(&self) -> &'static str {
        match self {
            Reason::Sickness => "choroba",
            Reason::Injury => "uraz",
            Reason::OccupationalDisease => "choroba-z-povolania",
            Reason::Quarantine => "karantenne-opatrenie-izolacia",
            Reason::WorkInjury => "pracovny-uraz",
            Reason::Other => "ine",
        }
    }

    /// Exact match against the canonical codes or their legacy aliases.
    pub fn parse(code: &str) -> Option<Reason> {
        Reason::ALL
            .into_iter()
            .find(|r| r.as_str() == code || r.legacy_code() == code)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated PN record. Serializes to the public wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    pub patient_id: String,
    pub employer: String,
    pub reason: Reason,
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub issued: Date,
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub valid_from: Date,
    #[schema(value_type = String, format = Date, example = "2024-01-20")]
    pub valid_until: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-18")]
    pub check_up: Option<Date>,
    #[serde(default)]
    pub check_up_done: bool,
}

impl Record {
    /// True when the id asks for server-side assignment.
    pub fn has_placeholder_id(&self) -> bool {
        is_placeholder_id(&self.id)
    }

    /// True when both interval boundaries match `other`.
    pub fn same_interval(&self, other: &Record) -> bool {
        self.valid_from == other.valid_from && self.valid_until == other.valid_until
    }
}

pub fn is_placeholder_id(id: &str) -> bool {
    let id = id.trim();
    id.is_empty() || id == NEW_RECORD_PLACEHOLDER
}

/// Unvalidated request body for create and replace.
///
/// Every field is optional at this stage so that a missing field is reported
/// through the same field-validation path as a malformed one.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    #[serde(default)]
    #[schema(example = "@new")]
    pub id: Option<String>,
    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub full_name: Option<String>,
    #[serde(default)]
    #[schema(example = "1123134223")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    #[schema(example = "sickness")]
    pub reason: Option<String>,
    #[serde(default)]
    #[schema(format = Date, example = "2024-01-10")]
    pub issued: Option<String>,
    #[serde(default)]
    #[schema(format = Date, example = "2024-01-10")]
    pub valid_from: Option<String>,
    #[serde(default)]
    #[schema(format = Date, example = "2024-01-20")]
    pub valid_until: Option<String>,
    #[serde(default)]
    #[schema(format = Date)]
    pub check_up: Option<String>,
    #[serde(default)]
    pub check_up_done: bool,
}

impl RecordInput {
    /// Runs the field predicates and the date-order check, producing a typed record.
    ///
    /// The first violated rule wins: patientId, fullName, employer, reason, then
    /// the dates in declaration order, then their ordering.
    pub fn into_record(self) -> Result<Record, RecordError> {
        let patient_id = validation::patient_id(self.patient_id.as_deref())?;
        let full_name = validation::full_name(self.full_name.as_deref())?;
        let employer = validation::employer(self.employer.as_deref())?;
        let reason = validation::reason(self.reason.as_deref())?;

        let issued = validation::required_date("issued", self.issued.as_deref())?;
        let valid_from = validation::required_date("validFrom", self.valid_from.as_deref())?;
        let valid_until = validation::required_date("validUntil", self.valid_until.as_deref())?;
        let check_up = validation::optional_date("checkUp", self.check_up.as_deref())?;

        let record = Record {
            id: self.id.map(|s| s.trim().to_string()).unwrap_or_default(),
            full_name,
            patient_id,
            employer,
            reason,
            issued,
            valid_from,
            valid_until,
            check_up,
            check_up_done: self.check_up_done,
        };
        validation::date_order(&record)?;
        Ok(record)
    }
}

/// Stored shape: dates become midnight-UTC timestamps.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordDocument {
    id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    full_name: String,
    patient_id: String,
    employer: String,
    reason: Reason,
    #[serde(with = "date::as_timestamp")]
    issued: Date,
    #[serde(with = "date::as_timestamp")]
    valid_from: Date,
    #[serde(with = "date::as_timestamp")]
    valid_until: Date,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "date::as_timestamp::option"
    )]
    check_up: Option<Date>,
    #[serde(default)]
    check_up_done: bool,
}

impl Document for Record {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_document(&self) -> Result<JsonValue, StoreError> {
        let doc = RecordDocument {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            patient_id: self.patient_id.clone(),
            employer: self.employer.clone(),
            reason: self.reason,
            issued: self.issued,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            check_up: self.check_up,
            check_up_done: self.check_up_done,
        };
        serde_json::to_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn from_document(doc: JsonValue) -> Result<Self, StoreError> {
        let d: RecordDocument =
            serde_json::from_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Record {
            id: d.id,
            full_name: d.full_name,
            patient_id: d.patient_id,
            employer: d.employer,
            reason: d.reason,
            issued: d.issued,
            valid_from: d.valid_from,
            valid_until: d.valid_until,
            check_up: d.check_up,
            check_up_done: d.check_up_done,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> RecordInput {
        serde_json::from_value(json!({
            "id": "@new",
            "fullName": "Jane Doe",
            "patientId": "123",
            "employer": "FIIT STU",
            "reason": "sickness",
            "issued": "2024-01-09",
            "validFrom": "2024-01-10",
            "validUntil": "2024-01-20",
            "checkUpDone": false
        }))
        .unwrap()
    }

    #[test]
    fn input_becomes_typed_record() {
        let record = input().into_record().unwrap();
        assert!(record.has_placeholder_id());
        assert_eq!(record.reason, Reason::Sickness);
        assert_eq!(record.valid_until.to_string(), "2024-01-20");
        assert_eq!(record.check_up, None);
    }

    #[test]
    fn wire_format_omits_absent_check_up() {
        let record = input().into_record().unwrap();
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["validFrom"], "2024-01-10");
        assert_eq!(v["reason"], "sickness");
        assert!(v.get("checkUp").is_none());
    }

    #[test]
    fn legacy_reason_codes_are_normalised() {
        let mut i = input();
        i.reason = Some("pracovny-uraz".into());
        assert_eq!(i.into_record().unwrap().reason, Reason::WorkInjury);
        let r: Reason = serde_json::from_value(json!("choroba")).unwrap();
        assert_eq!(r, Reason::Sickness);
    }

    #[test]
    fn document_form_stores_midnight_timestamps() {
        let mut i = input();
        i.check_up = Some("2024-01-15".into());
        let record = i.into_record().unwrap();

        let doc = record.to_document().unwrap();
        let stored = doc["validFrom"].as_str().unwrap();
        assert!(stored.starts_with("2024-01-10T00:00:00"), "got {stored}");
        assert_eq!(doc["patientId"], "123");

        let back = Record::from_document(doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn placeholder_ids() {
        assert!(is_placeholder_id(""));
        assert!(is_placeholder_id(" @new "));
        assert!(!is_placeholder_id("abc"));
    }
}
