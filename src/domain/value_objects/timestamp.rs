//! # Timestamp Value Object
//!
//! UTC instant used for record audit stamps.
//!
//! Timestamps serialize as RFC 3339 strings with full sub-second precision,
//! so a value written to a JSON file or a SQLite text column reads back
//! unchanged.
//!
//! # Examples
//!
//! ```
//! use eblotter::domain::value_objects::timestamp::Timestamp;
//!
//! let created = Timestamp::now();
//! let updated = Timestamp::refreshed_after(&created);
//!
//! assert!(updated.is_after(&created));
//! ```

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC timestamp with nanosecond precision.
///
/// # Invariants
///
/// - Always in UTC timezone
/// - Round-trips exactly through its RFC 3339 form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the current moment, or the smallest representable step after
    /// `previous` when the clock has not advanced past it.
    ///
    /// # Examples
    ///
    /// ```
    /// use eblotter::domain::value_objects::timestamp::Timestamp;
    ///
    /// let far_future = Timestamp::now().add_secs(3600);
    /// let next = Timestamp::refreshed_after(&far_future);
    /// assert!(next.is_after(&far_future));
    /// ```
    #[must_use]
    pub fn refreshed_after(previous: &Self) -> Self {
        let now = Self::now();
        if now.is_after(previous) {
            now
        } else {
            Self(previous.0 + Duration::microseconds(1))
        }
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parses an RFC 3339 string, normalizing any offset to UTC.
    ///
    /// Returns `None` if the string is not valid RFC 3339.
    ///
    /// # Examples
    ///
    /// ```
    /// use eblotter::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::parse_rfc3339("2024-01-01T00:00:00+02:00").unwrap();
    /// assert_eq!(ts.timestamp_secs(), 1704060000);
    /// ```
    #[must_use]
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Parses a stored stamp, accepting RFC 3339 or an offset-less ISO 8601
    /// date-time (`2024-05-01T10:30:00.123456`), which is read as UTC.
    ///
    /// Returns `None` if neither form matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use eblotter::domain::value_objects::timestamp::Timestamp;
    ///
    /// let naive = Timestamp::parse_lenient("2024-01-01T00:00:00.5").unwrap();
    /// let strict = Timestamp::parse_rfc3339("2024-01-01T00:00:00.5Z").unwrap();
    /// assert_eq!(naive, strict);
    /// ```
    #[must_use]
    pub fn parse_lenient(value: &str) -> Option<Self> {
        Self::parse_rfc3339(value).or_else(|| {
            let value = value.trim();
            value
                .parse::<NaiveDateTime>()
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()
                .map(|naive| Self(naive.and_utc()))
        })
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds seconds to the timestamp (can be negative).
    #[must_use]
    pub fn add_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Formats the timestamp as RFC 3339 with nanosecond precision.
    ///
    /// This is the storage form used by the SQLite backend.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}
