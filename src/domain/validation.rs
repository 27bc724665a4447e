//! Field-level predicates for incoming PN records.

use crate::domain::date::Date;
use crate::domain::error::RecordError;
use crate::domain::record::{Reason, Record};

/// Maximum length (in characters) of `fullName` and `employer`.
pub const MAX_TEXT_LEN: usize = 50;
/// Maximum number of digits of `patientId`.
pub const MAX_PATIENT_ID_DIGITS: usize = 10;

/// `^\d{1,10}$`
pub fn is_valid_patient_id(value: &str) -> bool {
    (1..=MAX_PATIENT_ID_DIGITS).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_within_max_length(value: &str) -> bool {
    value.chars().count() <= MAX_TEXT_LEN
}

fn invalid(field: &str, message: impl Into<String>) -> RecordError {
    RecordError::FieldValidation {
        field: field.to_string(),
        message: message.into(),
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, RecordError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid(field, "is required")),
    }
}

pub fn patient_id(value: Option<&str>) -> Result<String, RecordError> {
    let v = required("patientId", value)?;
    if !is_valid_patient_id(v) {
        return Err(invalid("patientId", "must contain 1 to 10 digits only"));
    }
    Ok(v.to_string())
}

/// Empty or absent means "take the name from the patient's other records".
pub fn full_name(value: Option<&str>) -> Result<String, RecordError> {
    let v = value.unwrap_or_default().trim();
    if !is_within_max_length(v) {
        return Err(invalid("fullName", "must be at most 50 characters"));
    }
    Ok(v.to_string())
}

pub fn employer(value: Option<&str>) -> Result<String, RecordError> {
    let v = required("employer", value.map(str::trim))?;
    if !is_within_max_length(v) {
        return Err(invalid("employer", "must be at most 50 characters"));
    }
    Ok(v.to_string())
}

pub fn reason(value: Option<&str>) -> Result<Reason, RecordError> {
    let v = required("reason", value)?;
    Reason::parse(v).ok_or_else(|| {
        let allowed: Vec<&str> = Reason::ALL.iter().map(Reason::as_str).collect();
        invalid("reason", format!("must be one of: {}", allowed.join(", ")))
    })
}

pub fn required_date(field: &str, value: Option<&str>) -> Result<Date, RecordError> {
    let v = value.ok_or_else(|| invalid(field, "is required"))?;
    Date::parse(v).map_err(|source| RecordError::Date {
        field: field.to_string(),
        source,
    })
}

pub fn optional_date(field: &str, value: Option<&str>) -> Result<Option<Date>, RecordError> {
    value.map(|v| required_date(field, Some(v))).transpose()
}

/// `validFrom <= validUntil`, and `validFrom <= checkUp` when a check-up is set.
pub fn date_order(record: &Record) -> Result<(), RecordError> {
    if record.valid_from.after(&record.valid_until) {
        return Err(RecordError::DateOrder(
            "validFrom must not be after validUntil".to_string(),
        ));
    }
    if let Some(check_up) = &record.check_up {
        if record.valid_from.after(check_up) {
            return Err(RecordError::DateOrder(
                "checkUp must not be before validFrom".to_string(),
            ));
        }
    }
    Ok(())
}
