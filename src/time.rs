use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

use crate::error::{OdhError, Result};

/// Format for time range bounds in request paths, e.g. `2024-01-31T23:00:00.000+0100`
pub const REQUEST_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Format of timestamps inside response payloads, e.g. `2024-01-31 23:00:00.000+0100`
pub const RESPONSE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f%z";

/// Render a time range bound the way request paths expect it
pub fn format_request_time(dt: &DateTime<FixedOffset>) -> String {
    dt.format(REQUEST_TIME_FORMAT).to_string()
}

/// Timestamp as found in response payloads.
///
/// Both the string `"null"` and a JSON `null` map to the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TsTime(pub DateTime<FixedOffset>);

impl TsTime {
    /// The Unix epoch, used for missing timestamps
    pub fn epoch() -> Self {
        TsTime(DateTime::<Utc>::default().into())
    }

    /// Check if this is the placeholder for a missing timestamp
    pub fn is_epoch(&self) -> bool {
        self.0.timestamp() == 0 && self.0.timestamp_subsec_nanos() == 0
    }

    /// Parse the payload format; `"null"` yields the epoch
    pub fn parse(s: &str) -> Result<Self> {
        if s == "null" {
            return Ok(Self::epoch());
        }
        DateTime::parse_from_str(s, RESPONSE_TIME_FORMAT)
            .map(TsTime)
            .map_err(|source| OdhError::Timestamp {
                value: s.to_string(),
                source,
            })
    }

    /// Render back to the payload format
    pub fn format(&self) -> String {
        self.0.format(RESPONSE_TIME_FORMAT).to_string()
    }
}

impl Default for TsTime {
    fn default() -> Self {
        Self::epoch()
    }
}

impl Deref for TsTime {
    type Target = DateTime<FixedOffset>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<FixedOffset>> for TsTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        TsTime(dt)
    }
}

impl From<TsTime> for DateTime<FixedOffset> {
    fn from(t: TsTime) -> Self {
        t.0
    }
}

impl Serialize for TsTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for TsTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(TsTime::epoch()),
            Some(s) => TsTime::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_deserialization() {
        let time: TsTime = serde_json::from_str(r#""2024-03-05 14:30:15.250+0100""#).unwrap();

        let expected = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 14, 30, 15)
            .unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(*time, expected);
        assert_eq!(time.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_time_null() {
        let from_string: TsTime = serde_json::from_str(r#""null""#).unwrap();
        let from_null: TsTime = serde_json::from_str("null").unwrap();

        assert!(from_string.is_epoch());
        assert!(from_null.is_epoch());
        assert_eq!(from_string.timestamp(), 0);
    }

    #[test]
    fn test_time_malformed() {
        let result: std::result::Result<TsTime, _> =
            serde_json::from_str(r#""2024-03-05T14:30:15+01:00""#);
        assert!(result.is_err());
        assert!(TsTime::parse("yesterday").is_err());
    }

    #[test]
    fn test_time_serialization() {
        let time = TsTime::parse("2021-12-01 08:00:00.000+0000").unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, r#""2021-12-01 08:00:00.000+0000""#);
    }

    #[test]
    fn test_request_time_format() {
        let dt = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 7, 1, 0, 0, 0)
            .unwrap();
        assert_eq!(format_request_time(&dt), "2023-07-01T00:00:00.000+0200");

        let negative = FixedOffset::west_opt(5 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2023, 7, 1, 12, 5, 9)
            .unwrap();
        assert_eq!(format_request_time(&negative), "2023-07-01T12:05:09.000-0530");
    }
}
