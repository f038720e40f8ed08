//! Timestamp decoding
//!
//! Neutron and Glance emit RFC 3339 with a zone, Nova and Cinder emit
//! zone-less ISO-8601 (`2024-05-01T12:00:00.000000`) meaning UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Swift `X-Timestamp`: fractional seconds since the epoch
pub fn parse_unix(value: &str) -> Option<DateTime<Utc>> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9).round() as u32;
    DateTime::from_timestamp(whole, nanos.min(999_999_999))
}

/// Deserialize a required timestamp, falling back to the epoch when absent
/// or unparseable so one odd record does not fail a whole page.
pub fn lenient<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse).unwrap_or(DateTime::UNIX_EPOCH))
}

pub fn lenient_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse("2024-05-01T10:00:00Z"), Some(expected));
        assert_eq!(parse("2024-05-01T12:00:00+02:00"), Some(expected));
    }

    #[test]
    fn test_parse_zoneless_is_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse("2024-05-01T10:00:00"), Some(expected));
        assert_eq!(parse("2024-05-01T10:00:00.000000"), Some(expected));
        assert_eq!(parse("2024-05-01 10:00:00"), Some(expected));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
    }

    #[test]
    fn test_parse_unix() {
        let t = parse_unix("1714557600.50000").unwrap();
        assert_eq!(t.timestamp(), 1714557600);
        assert_eq!(t.timestamp_subsec_millis(), 500);
        assert_eq!(parse_unix("-1"), None);
        assert_eq!(parse_unix("abc"), None);
    }

    #[test]
    fn test_lenient_fields() {
        #[derive(Deserialize)]
        struct Record {
            #[serde(default, deserialize_with = "lenient")]
            created_at: DateTime<Utc>,
            #[serde(default, deserialize_with = "lenient_option")]
            expires_at: Option<DateTime<Utc>>,
        }

        let r: Record = serde_json::from_str(r#"{"created_at": null, "expires_at": null}"#).unwrap();
        assert_eq!(r.created_at, DateTime::UNIX_EPOCH);
        assert_eq!(r.expires_at, None);

        let r: Record = serde_json::from_str(
            r#"{"created_at": "2024-05-01T10:00:00", "expires_at": "2024-06-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(r.created_at.timestamp(), 1714557600);
        assert!(r.expires_at.is_some());

        let r: Record = serde_json::from_str("{}").unwrap();
        assert_eq!(r.created_at, DateTime::UNIX_EPOCH);
    }
}
