//! Recurring pairing schedule value object.
//!
//! A pairing describes when the two parties of a mentorship request
//! meet: a start/end time of day, a set of weekdays, and the IANA
//! timezone every date computation for the request is performed in.

use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{MentoraError, MentoraResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Weekdays the pairing meets on, serialized as lower-case full
    /// names ("monday".."sunday").
    #[serde(with = "weekday_names")]
    pub days: Vec<Weekday>,
    pub timezone: Tz,
}

impl Pairing {
    /// Field-level validation of the pairing shape.
    pub fn validate(&self) -> MentoraResult<()> {
        if self.days.is_empty() {
            return Err(MentoraError::validation(
                "days",
                "at least one pairing day is required",
            ));
        }
        for (i, day) in self.days.iter().enumerate() {
            if self.days[..i].contains(day) {
                return Err(MentoraError::validation(
                    "days",
                    format!("duplicate pairing day: {}", weekday_name(*day)),
                ));
            }
        }
        if self.start_time >= self.end_time {
            return Err(MentoraError::validation(
                "start_time",
                "start time must be before end time",
            ));
        }
        Ok(())
    }

    /// Length of one session in minutes.
    pub fn session_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Lower-case full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse a weekday from its English name (short or full, any case).
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.parse::<Weekday>().ok()
}

/// Serde helpers for `Vec<Weekday>` as lower-case full names.
pub mod weekday_names {
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|d| super::weekday_name(*d)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Weekday>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                super::parse_weekday(name)
                    .ok_or_else(|| D::Error::custom(format!("unknown weekday: {name}")))
            })
            .collect()
    }
}
