//! Validation helpers
//!
//! Input normalization shared by every request struct: empty strings become
//! `None` (or "clear" on updates), plate numbers are canonicalized, and date
//! inputs are parsed into UTC instants.

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use validator::ValidationError;

use crate::utils::errors::AppError;

lazy_static! {
    static ref PLATE_RE: Regex = Regex::new(r"^[A-Z0-9][A-Z0-9 -]{0,19}$").expect("valid plate regex");
}

/// Deserialize an optional field, turning `null`, `""` and whitespace-only
/// strings into `None`. Non-empty strings are trimmed before `T` sees them.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    };
    T::deserialize(value).map(Some).map_err(de::Error::custom)
}

/// Patch semantics for updates, used with `#[serde(default)]`: an absent
/// field is `None` (keep), `""`/`null` is `Some(None)` (clear)
pub fn patch_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    empty_string_as_none(deserializer).map(Some)
}

/// Canonical form of a plate number: trimmed, upper-cased, inner whitespace collapsed
pub fn normalize_plate(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Validate a plate number after normalization
pub fn validate_plate_number(value: &str) -> Result<(), ValidationError> {
    let plate = normalize_plate(value);
    if !PLATE_RE.is_match(&plate) {
        let mut error = ValidationError::new("plate_no");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"letters, digits, spaces or dashes (max 20)".to_string());
        return Err(error);
    }
    Ok(())
}

/// Parse a date given as `YYYY-MM-DD` or RFC 3339
pub fn parse_date_input(value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid date '{}': expected YYYY-MM-DD or RFC3339",
                value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Deserialize)]
    struct Optionals {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        value: Option<String>,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        born: Option<NaiveDate>,
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "patch_field")]
        color: Option<Option<String>>,
    }

    #[test]
    fn test_empty_string_as_none() {
        let fields: Optionals = serde_json::from_str(r#"{"value": "", "born": ""}"#).unwrap();
        assert_eq!(fields.value, None);
        assert_eq!(fields.born, None);

        let fields: Optionals = serde_json::from_str(r#"{"value": "   "}"#).unwrap();
        assert_eq!(fields.value, None);

        let fields: Optionals = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(fields.value, None);

        let fields: Optionals = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(fields.value, None);

        let fields: Optionals = serde_json::from_str(r#"{"value": " Red ", "born": "1990-02-03"}"#).unwrap();
        assert_eq!(fields.value.as_deref(), Some("Red"));
        assert_eq!(fields.born, NaiveDate::from_ymd_opt(1990, 2, 3));

        assert!(serde_json::from_str::<Optionals>(r#"{"born": "03/02/1990"}"#).is_err());
    }

    #[test]
    fn test_empty_string_as_none_for_structured_values() {
        #[derive(Deserialize)]
        struct Structured {
            #[serde(default, deserialize_with = "empty_string_as_none")]
            kind: Option<Kind>,
            #[serde(default, deserialize_with = "empty_string_as_none")]
            days: Option<Vec<String>>,
        }

        #[derive(Debug, PartialEq, Deserialize)]
        enum Kind {
            Old,
            New,
        }

        let fields: Structured = serde_json::from_str(r#"{"kind": "", "days": ""}"#).unwrap();
        assert_eq!(fields.kind, None);
        assert_eq!(fields.days, None);

        let fields: Structured = serde_json::from_str(r#"{"kind": "New", "days": ["2024-06-01"]}"#).unwrap();
        assert_eq!(fields.kind, Some(Kind::New));
        assert_eq!(fields.days, Some(vec!["2024-06-01".to_string()]));

        assert!(serde_json::from_str::<Structured>(r#"{"kind": "Newest"}"#).is_err());
    }

    #[test]
    fn test_patch_field() {
        let patch: Patch = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(patch.color, None);

        let patch: Patch = serde_json::from_str(r#"{"color": ""}"#).unwrap();
        assert_eq!(patch.color, Some(None));

        let patch: Patch = serde_json::from_str(r#"{"color": null}"#).unwrap();
        assert_eq!(patch.color, Some(None));

        let patch: Patch = serde_json::from_str(r#"{"color": "Blue"}"#).unwrap();
        assert_eq!(patch.color, Some(Some("Blue".to_string())));
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("  abc   1234 "), "ABC 1234");
        assert_eq!(normalize_plate("123456"), "123456");
    }

    #[test]
    fn test_validate_plate_number() {
        assert!(validate_plate_number("ABC 1234").is_ok());
        assert!(validate_plate_number("nba-123").is_ok());
        assert!(validate_plate_number("1301-0000123").is_ok());
        assert!(validate_plate_number("").is_err());
        assert!(validate_plate_number("AB#123").is_err());
        assert!(validate_plate_number("ABCDEFGHIJKLMNOPQRSTUVWXYZ").is_err());
    }

    #[test]
    fn test_parse_date_input() {
        let d = parse_date_input("2024-06-01").unwrap();
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2024, 6, 1, 0));

        let d = parse_date_input("2024-06-01T08:30:00+08:00").unwrap();
        assert_eq!((d.day(), d.hour()), (1, 0));

        assert!(matches!(
            parse_date_input("06/01/2024"),
            Err(AppError::BadRequest(_))
        ));
    }
}
