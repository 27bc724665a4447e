use crate::domain::record::Record;

/// A patient's records split around the one being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestSplit {
    /// Every record except the edited one.
    pub others: Vec<Record>,
    /// The stored version of the edited record, if the patient has it.
    pub edited: Option<Record>,
    /// True only when `edited` is the record with the greatest `validUntil`.
    pub is_latest: bool,
}

/// Picks the record with the greatest `validUntil`; on a tie the smallest id wins.
pub fn latest_record(records: &[Record]) -> Option<&Record> {
    records.iter().reduce(|best, r| {
        if r.valid_until.after(&best.valid_until)
            || (r.valid_until == best.valid_until && r.id < best.id)
        {
            r
        } else {
            best
        }
    })
}

/// Removes `edited_id` from the patient's records and reports whether it was the latest.
pub fn split_latest(records: Vec<Record>, edited_id: &str) -> LatestSplit {
    let latest_id = latest_record(&records).map(|r| r.id.clone());

    let (mut edited, others): (Vec<Record>, Vec<Record>) =
        records.into_iter().partition(|r| r.id == edited_id);
    let edited = edited.pop();
    let is_latest = edited.is_some() && latest_id.as_deref() == Some(edited_id);

    LatestSplit {
        others,
        edited,
        is_latest,
    }
}
