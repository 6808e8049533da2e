//! Tolerant field decoders for snapshots written by older deployments
//!
//! Ids and types came straight from request bodies, so numbers and booleans
//! show up where strings are expected. A single odd field must not make the
//! whole snapshot unreadable.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Any scalar as a string; null, arrays and objects become `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

/// Any scalar as a string; anything else is an error
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// Download type: any scalar, with null or empty meaning the default type
pub fn download_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| crate::DEFAULT_DOWNLOAD_TYPE.to_string()))
}

/// RFC 3339 string or epoch milliseconds; anything unreadable becomes `None`
pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "opt_timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(deserialize_with = "download_type")]
        kind: String,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numbers_become_strings() {
        let s = sample(r#"{"id": 42, "kind": 7}"#);
        assert_eq!(s.id.as_deref(), Some("42"));
        assert_eq!(s.kind, "7");
    }

    #[test]
    fn test_null_and_empty_kind_use_default() {
        assert_eq!(sample(r#"{"kind": null}"#).kind, "rdx");
        assert_eq!(sample(r#"{"kind": ""}"#).kind, "rdx");
        assert!(sample(r#"{"kind": "c3c"}"#).id.is_none());
    }

    #[test]
    fn test_timestamps_from_string_or_millis() {
        let s = sample(r#"{"at": "2024-01-02T03:04:05.678Z", "kind": "rdx"}"#);
        assert_eq!(s.at.unwrap().timestamp_millis(), 1_704_164_645_678);

        let s = sample(r#"{"at": 1704164645678, "kind": "rdx"}"#);
        assert_eq!(s.at.unwrap().timestamp_millis(), 1_704_164_645_678);

        let s = sample(r#"{"at": "next tuesday", "kind": "rdx"}"#);
        assert!(s.at.is_none());
    }
}
