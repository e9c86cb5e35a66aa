//! # Temporal Types: UTC Timestamps
//!
//! `Timestamp` is an instant in UTC parsed from RFC 3339 text. Receipts and
//! key registers are produced by brokers in many timezones; comparisons
//! between a receipt's `effective` date and a key's validity window must
//! compare instants, so every parse converts to UTC.
//!
//! Sub-second precision is preserved. A receipt effective half a second
//! before a key's `from` bound is still backdated.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC instant.
///
/// Serializes as RFC 3339 with a `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap a `chrono::DateTime<Utc>`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimestamp` for anything that is not
    /// RFC 3339 (bare dates, missing offsets, free text).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::InvalidTimestamp {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as RFC 3339 with `Z` suffix, e.g. `2019-01-01T00:00:00Z`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_z_suffix() {
        let ts = Timestamp::parse("2018-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2018-01-01T00:00:00Z");
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        let ts = Timestamp::parse("2019-01-01T05:30:00+05:30").unwrap();
        assert_eq!(ts, Timestamp::parse("2019-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn parse_keeps_subseconds() {
        let a = Timestamp::parse("2019-01-01T00:00:00.500Z").unwrap();
        let b = Timestamp::parse("2019-01-01T00:00:00Z").unwrap();
        assert!(b < a);
        assert_eq!(a.to_rfc3339(), "2019-01-01T00:00:00.500Z");
    }

    #[test]
    fn parse_rejects_non_rfc3339() {
        assert!(Timestamp::parse("2019-01-01").is_err());
        assert!(Timestamp::parse("2019-01-01T00:00:00").is_err());
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn ordering_follows_instants() {
        let earlier = Timestamp::from_utc(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap());
        let later = Timestamp::parse("2017-01-01T00:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn serde_uses_rfc3339() {
        let ts = Timestamp::parse("2020-06-30T23:59:59Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2020-06-30T23:59:59Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
