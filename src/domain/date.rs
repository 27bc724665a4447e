//! Calendar-day value used for every date field of a PN record.
//!
//! Wire form is `YYYY-MM-DD`. Persisted form is a timestamp at midnight UTC,
//! of which only the date component is read back.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// First accepted day (inclusive) as `(year, day of year)`: 0001-01-02.
pub const MIN_DAY: (i32, u32) = (1, 2);
/// Last accepted day (inclusive) as `(year, day of year)`: 9999-12-31.
pub const MAX_DAY: (i32, u32) = (9999, 365);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("invalid date format, must be YYYY-MM-DD: {0:?}")]
    InvalidFormat(String),
    #[error("date is out of range, must be between 0001-01-02 and 9999-12-31: {0}")]
    OutOfRange(String),
}

/// A calendar day without time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Parses strict `YYYY-MM-DD` text. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, DateError> {
        let s = text.trim();
        if !has_date_shape(s) {
            return Err(DateError::InvalidFormat(text.to_string()));
        }

        let day = NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|_| DateError::InvalidFormat(text.to_string()))?;
        Self::from_naive(day).map_err(|_| DateError::OutOfRange(s.to_string()))
    }

    fn from_naive(day: NaiveDate) -> Result<Self, DateError> {
        let key = (day.year(), day.ordinal());
        if key < MIN_DAY || key > MAX_DAY {
            return Err(DateError::OutOfRange(day.format(DATE_FORMAT).to_string()));
        }
        Ok(Self(day))
    }

    /// True iff `self` is strictly later than `other`. Equal days are not "after".
    pub fn after(&self, other: &Date) -> bool {
        self.0 > other.0
    }

    /// Midnight UTC of this day, the persisted representation.
    pub fn to_timestamp(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }

    /// Takes the UTC calendar day of a persisted timestamp.
    pub fn from_timestamp(ts: DateTime<Utc>) -> Result<Self, DateError> {
        Self::from_naive(ts.date_naive())
    }
}

// chrono accepts unpadded fields and signed years, so check the shape first.
fn has_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for the persisted (timestamp) form.
pub mod as_timestamp {
    use super::Date;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        date.to_timestamp().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let ts = DateTime::<Utc>::deserialize(deserializer)?;
        Date::from_timestamp(ts).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::Date;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)?
                .map(|ts| Date::from_timestamp(ts).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // Days from the common era for 0001-01-02 and 9999-12-31.
    const FIRST_CE_DAY: i32 = 2;
    const LAST_CE_DAY: i32 = 3_652_059;

    #[test]
    fn ce_bounds_match_the_accepted_range() {
        let first = NaiveDate::from_num_days_from_ce_opt(FIRST_CE_DAY).unwrap();
        let last = NaiveDate::from_num_days_from_ce_opt(LAST_CE_DAY).unwrap();
        assert_eq!(first.to_string(), "0001-01-02");
        assert_eq!(last.to_string(), "9999-12-31");
        assert!(Date::from_naive(first.pred_opt().unwrap()).is_err());
        assert!(Date::from_naive(last.succ_opt().unwrap()).is_err());
    }

    proptest! {
        /// Formatting then parsing gives back the same day, for every accepted day
        #[test]
        fn text_round_trip(ce in FIRST_CE_DAY..=LAST_CE_DAY) {
            let day = NaiveDate::from_num_days_from_ce_opt(ce).unwrap();
            let date = Date::from_naive(day).unwrap();
            let text = date.to_string();
            prop_assert_eq!(text.len(), 10);
            prop_assert_eq!(Date::parse(&text).unwrap(), date);
        }

        /// The persisted timestamp keeps the calendar day
        #[test]
        fn timestamp_round_trip(ce in FIRST_CE_DAY..=LAST_CE_DAY) {
            let date = Date::from_naive(NaiveDate::from_num_days_from_ce_opt(ce).unwrap()).unwrap();
            prop_assert_eq!(Date::from_timestamp(date.to_timestamp()).unwrap(), date);
        }

        /// `after` agrees with calendar order and is never reflexive
        #[test]
        fn after_matches_day_order(a in FIRST_CE_DAY..=LAST_CE_DAY, b in FIRST_CE_DAY..=LAST_CE_DAY) {
            let da = Date::from_naive(NaiveDate::from_num_days_from_ce_opt(a).unwrap()).unwrap();
            let db = Date::from_naive(NaiveDate::from_num_days_from_ce_opt(b).unwrap()).unwrap();
            prop_assert_eq!(da.after(&db), a > b);
        }
    }
}
