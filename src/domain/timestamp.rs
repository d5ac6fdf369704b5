//! Lenient timestamp parsing for server payloads.
//!
//! The storefront API emits naive ISO-8601 (`2024-05-01T12:30:00`) through its
//! custom encoder, but falls back to RFC 2822 (`Wed, 01 May 2024 12:30:00 GMT`)
//! on endpoints that bypass it. Naive values are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| {
        parse(&value).ok_or_else(|| de::Error::custom(format!("unrecognized timestamp: {value}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_every_server_format() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(parse("2024-05-01T12:30:00"), Some(expected));
        assert_eq!(parse("2024-05-01 12:30:00"), Some(expected));
        assert_eq!(parse("2024-05-01T12:30:00Z"), Some(expected));
        assert_eq!(parse("Wed, 01 May 2024 12:30:00 GMT"), Some(expected));
    }

    #[test]
    fn keeps_fractional_seconds() {
        let parsed = parse("2024-05-01T12:30:00.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse("yesterday"), None);
    }
}
