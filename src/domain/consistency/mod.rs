//! Admission rules for PN records of one patient.
//!
//! Everything here is pure: callers fetch the patient's records, pass them in
//! and persist the returned record only on `Ok`. The checks run in a fixed
//! order and the first failing rule is reported.

mod interval;
mod latest;
mod name;

pub use interval::check_overlap;
pub use latest::{latest_record, split_latest, LatestSplit};
pub use name::reconcile_full_name;

use crate::domain::error::RecordError;
use crate::domain::record::Record;

/// Decides a create. `existing` holds every stored record with the candidate's patient id.
pub fn admit_create(mut candidate: Record, existing: &[Record]) -> Result<Record, RecordError> {
    reconcile_full_name(&mut candidate, existing)?;
    check_overlap(&candidate, existing)?;
    Ok(candidate)
}

/// Decides a full replace of `candidate.id` within the same patient.
///
/// Only the patient's latest record may move its interval, and only then is it
/// checked against the remaining records. An older record keeps its interval;
/// its other fields may still change.
pub fn admit_update(mut candidate: Record, existing: Vec<Record>) -> Result<Record, RecordError> {
    reconcile_full_name(&mut candidate, &existing)?;

    let split = split_latest(existing, &candidate.id);
    match &split.edited {
        Some(_) if !split.is_latest => check_historical(&candidate, &split)?,
        _ => check_overlap(&candidate, &split.others)?,
    }
    Ok(candidate)
}

/// Decides a replace that moves `candidate.id` to another patient.
///
/// `previous` holds the records of the patient the record is stored under,
/// `existing` those of the patient it moves to. A record that is not the
/// latest of its previous patient still keeps its interval; at the new
/// patient it is checked like a create.
pub fn admit_patient_change(
    mut candidate: Record,
    existing: &[Record],
    previous: Vec<Record>,
) -> Result<Record, RecordError> {
    reconcile_full_name(&mut candidate, existing)?;

    let split = split_latest(previous, &candidate.id);
    if split.edited.is_some() && !split.is_latest {
        check_historical(&candidate, &split)?;
    }
    check_overlap(&candidate, existing)?;
    Ok(candidate)
}

fn check_historical(candidate: &Record, split: &LatestSplit) -> Result<(), RecordError> {
    match &split.edited {
        Some(stored) if !candidate.same_interval(stored) => {
            Err(RecordError::HistoricalIntervalImmutable)
        }
        _ => Ok(()),
    }
}

/// The id in the request path must name the record in the body.
pub fn check_identity(path_id: &str, candidate: &Record) -> Result<(), RecordError> {
    if path_id != candidate.id {
        return Err(RecordError::IdentityMismatch {
            path_id: path_id.to_string(),
            body_id: candidate.id.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::domain::date::Date;
    use crate::domain::record::{Reason, Record};

    pub fn record(id: &str, full_name: &str, from: &str, until: &str) -> Record {
        record_of("123", id, full_name, from, until)
    }

    pub fn record_of(patient_id: &str, id: &str, full_name: &str, from: &str, until: &str) -> Record {
        Record {
            id: id.to_string(),
            full_name: full_name.to_string(),
            patient_id: patient_id.to_string(),
            employer: "ACME".to_string(),
            reason: Reason::Sickness,
            issued: Date::parse(from).unwrap(),
            valid_from: Date::parse(from).unwrap(),
            valid_until: Date::parse(until).unwrap(),
            check_up: None,
            check_up_done: false,
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::testing::record_of;
    use super::*;
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    const PATIENTS: [&str; 2] = ["123", "999"];
    const NAMES: [&str; 3] = ["", "Jane Doe", "John Roe"];

    #[derive(Debug, Clone)]
    enum Op {
        Create { patient: usize, name: usize, start: u64, len: u64 },
        Update { target: usize, patient: usize, name: usize, start: u64, len: u64 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..PATIENTS.len(), 0..NAMES.len(), 0u64..120, 0u64..15).prop_map(
                |(patient, name, start, len)| Op::Create { patient, name, start, len }
            ),
            (any::<usize>(), 0..PATIENTS.len(), 0..NAMES.len(), 0u64..120, 0u64..15).prop_map(
                |(target, patient, name, start, len)| Op::Update { target, patient, name, start, len }
            ),
        ]
    }

    fn day(offset: u64) -> String {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (base + Days::new(offset)).to_string()
    }

    fn of_patient(stored: &[Record], patient_id: &str) -> Vec<Record> {
        stored.iter().filter(|r| r.patient_id == patient_id).cloned().collect()
    }

    fn assert_consistent(stored: &[Record]) -> Result<(), TestCaseError> {
        for (i, a) in stored.iter().enumerate() {
            prop_assert!(!a.full_name.is_empty(), "record {} has no name", a.id);
            for b in stored.iter().skip(i + 1).filter(|b| b.patient_id == a.patient_id) {
                prop_assert!(
                    a.valid_from.after(&b.valid_until) || b.valid_from.after(&a.valid_until),
                    "{} and {} overlap",
                    a.id,
                    b.id
                );
                prop_assert_eq!(&a.full_name, &b.full_name);
            }
        }
        Ok(())
    }

    proptest! {
        /// Whatever sequence of requests arrives, accepted records of one patient
        /// never overlap and share one name.
        #[test]
        fn admitted_records_stay_consistent(ops in proptest::collection::vec(op(), 1..60)) {
            let mut stored: Vec<Record> = Vec::new();

            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Create { patient, name, start, len } => {
                        let candidate = record_of(
                            PATIENTS[patient],
                            &format!("r{n}"),
                            NAMES[name],
                            &day(start),
                            &day(start + len),
                        );
                        let existing = of_patient(&stored, PATIENTS[patient]);
                        if let Ok(admitted) = admit_create(candidate, &existing) {
                            stored.push(admitted);
                        }
                    }
                    Op::Update { target, patient, name, start, len } => {
                        if stored.is_empty() {
                            continue;
                        }
                        let index = target % stored.len();
                        let current = stored[index].clone();
                        let mut candidate = record_of(
                            PATIENTS[patient],
                            &current.id,
                            NAMES[name],
                            &day(start),
                            &day(start + len),
                        );
                        // Half of the updates keep the interval, which is the only
                        // way a historical record gets through.
                        if start % 2 == 0 {
                            candidate.valid_from = current.valid_from;
                            candidate.valid_until = current.valid_until;
                        }

                        let existing = of_patient(&stored, &candidate.patient_id);
                        let admitted = if current.patient_id == candidate.patient_id {
                            admit_update(candidate, existing)
                        } else {
                            let previous = of_patient(&stored, &current.patient_id);
                            admit_patient_change(candidate, &existing, previous)
                        };
                        if let Ok(admitted) = admitted {
                            stored[index] = admitted;
                        }
                    }
                }
                assert_consistent(&stored)?;
            }
        }
    }
}
