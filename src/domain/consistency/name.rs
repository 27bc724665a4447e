use crate::domain::error::RecordError;
use crate::domain::record::Record;

/// Settles the candidate's full name against the patient's other records.
///
/// All records in `existing` share one name, so the first one speaks for the set.
pub fn reconcile_full_name(candidate: &mut Record, existing: &[Record]) -> Result<(), RecordError> {
    let shared = existing.first().map(|r| r.full_name.as_str());

    match (candidate.full_name.is_empty(), shared) {
        (true, Some(name)) => {
            candidate.full_name = name.to_string();
            Ok(())
        }
        (true, None) => Err(RecordError::NameRequired),
        (false, Some(name)) if name != candidate.full_name => Err(RecordError::NameConflict {
            patient_id: candidate.patient_id.clone(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consistency::testing::record;

    #[test]
    fn empty_name_is_adopted_from_existing_records() {
        let existing = vec![record("a", "Jane Doe", "2024-01-10", "2024-01-20")];
        let mut candidate = record("b", "", "2024-02-01", "2024-02-05");
        reconcile_full_name(&mut candidate, &existing).unwrap();
        assert_eq!(candidate.full_name, "Jane Doe");
    }

    #[test]
    fn empty_name_without_history_is_required() {
        let mut candidate = record("b", "", "2024-02-01", "2024-02-05");
        assert_eq!(
            reconcile_full_name(&mut candidate, &[]),
            Err(RecordError::NameRequired)
        );
    }

    #[test]
    fn different_name_conflicts() {
        let existing = vec![record("a", "Jane Doe", "2024-01-10", "2024-01-20")];
        let mut candidate = record("b", "John Doe", "2024-02-01", "2024-02-05");
        assert!(matches!(
            reconcile_full_name(&mut candidate, &existing),
            Err(RecordError::NameConflict { .. })
        ));
    }

    #[test]
    fn matching_or_first_name_is_accepted() {
        let existing = vec![record("a", "Jane Doe", "2024-01-10", "2024-01-20")];
        let mut same = record("b", "Jane Doe", "2024-02-01", "2024-02-05");
        assert!(reconcile_full_name(&mut same, &existing).is_ok());

        let mut first = record("c", "New Patient", "2024-02-01", "2024-02-05");
        assert!(reconcile_full_name(&mut first, &[]).is_ok());
    }
}
