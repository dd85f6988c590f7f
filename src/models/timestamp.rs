//! # Timestamp Codec
//!
//! Timestamps are persisted as `YYYY-MM-DD HH:MM:SS` local-time text so that
//! plain string comparison and SQLite's `date()`/`datetime()` agree with
//! chronological order. This module is the only place that knows the format.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serializer;

use crate::error::{Result, TodoError};

/// Persisted timestamp format
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persisted calendar date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted client input formats, tried in order after RFC 3339
const INPUT_FORMATS: &[&str] = &[
    STORAGE_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

pub fn format(value: &NaiveDateTime) -> String {
    value.format(STORAGE_FORMAT).to_string()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Parses a value read back from the store.
pub fn parse_stored(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, STORAGE_FORMAT).map_err(|e| {
        TodoError::Internal(format!("corrupt timestamp in store '{raw}': {e}"))
    })
}

/// Parses a client-supplied timestamp into local time.
///
/// Offsets (`Z`, `+03:00`) are converted to the process's local timezone; naive
/// values are taken as local already. A bare date means midnight.
pub fn parse_input(field: &str, raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(truncate(with_offset.with_timezone(&Local).naive_local()));
    }

    for format in INPUT_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(truncate(value));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    Err(TodoError::invalid_input(format!(
        "{field} is not a valid timestamp: '{raw}' (expected YYYY-MM-DD HH:MM:SS)"
    )))
}

/// Parses an optional JSON timestamp: `null` and `""` clear the value.
pub fn parse_optional_input(
    field: &str,
    value: &serde_json::Value,
) -> Result<Option<NaiveDateTime>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => parse_input(field, s).map(Some),
        other => Err(TodoError::invalid_input(format!(
            "{field} must be a timestamp string, found: {other}"
        ))),
    }
}

fn truncate(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

/// Serializes a timestamp in the persisted format.
pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn serialize_optional<S>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_some(&format(v)),
        None => serializer.serialize_none(),
    }
}
