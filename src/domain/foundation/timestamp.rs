//! Wall-clock timestamp value object.
//!
//! Evaluation deadlines are stored as local wall-clock times without a zone
//! (`TIMESTAMP` columns), so every comparison against "now" happens in the
//! server's local time. The canonical text form is `YYYY-MM-DD HH:MM:SS`,
//! which is also what notifications quote back to students.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Canonical text format for wall-clock timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable point in local wall-clock time, second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Creates a timestamp for the current local moment.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    /// Creates a timestamp from a naive date-time, truncating sub-seconds.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        use chrono::Timelike;
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Creates a timestamp at midnight of the given calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "date",
                    format!("{:04}-{:02}-{:02} is not a calendar day", year, month, day),
                )
            })
    }

    /// Parses `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` as midnight.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
            return Ok(Self(dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(Self(dt));
            }
        }
        Err(ValidationError::invalid_format(
            "timestamp",
            format!("expected YYYY-MM-DD HH:MM:SS, got '{}'", s),
        ))
    }

    /// Returns the inner naive date-time.
    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_naive(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
