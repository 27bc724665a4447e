use crate::domain::error::RecordError;
use crate::domain::record::Record;

/// Rejects the candidate unless it starts strictly after every record in `others` ends.
///
/// Touching intervals (start on another record's last day) count as overlapping.
pub fn check_overlap(candidate: &Record, others: &[Record]) -> Result<(), RecordError> {
    match others
        .iter()
        .find(|r| !candidate.valid_from.after(&r.valid_until))
    {
        Some(r) => Err(RecordError::IntervalOverlap {
            conflicting_id: r.id.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consistency::testing::record;

    #[test]
    fn crossing_interval_overlaps() {
        let others = vec![record("a", "Jane", "2024-01-10", "2024-01-20")];
        let candidate = record("b", "Jane", "2024-01-15", "2024-01-25");
        assert_eq!(
            check_overlap(&candidate, &others),
            Err(RecordError::IntervalOverlap {
                conflicting_id: "a".into()
            })
        );
    }

    #[test]
    fn shared_boundary_day_overlaps() {
        let others = vec![record("a", "Jane", "2024-01-10", "2024-01-20")];
        let candidate = record("b", "Jane", "2024-01-20", "2024-01-25");
        assert!(check_overlap(&candidate, &others).is_err());
    }

    #[test]
    fn next_day_start_is_admissible() {
        let others = vec![record("a", "Jane", "2024-01-10", "2024-01-20")];
        let candidate = record("b", "Jane", "2024-01-21", "2024-01-31");
        assert!(check_overlap(&candidate, &others).is_ok());
    }

    #[test]
    fn interval_before_existing_history_is_rejected() {
        let others = vec![record("a", "Jane", "2024-03-01", "2024-03-10")];
        let candidate = record("b", "Jane", "2024-01-01", "2024-01-05");
        assert!(check_overlap(&candidate, &others).is_err());
    }

    #[test]
    fn empty_set_never_overlaps() {
        let candidate = record("b", "Jane", "2024-01-01", "2024-01-05");
        assert!(check_overlap(&candidate, &[]).is_ok());
    }
}
