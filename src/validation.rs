//! Input validation for the ToDo+ core
//!
//! Turns loosely typed client input (the web client sends numbers as strings,
//! booleans as `0`/`1`, identities as integers) into checked values before
//! anything reaches the store.

use crate::error::{Result, TodoError};
use serde_json::Value;

/// Maximum title length in characters
const MAX_TITLE_LENGTH: usize = 500;

/// Maximum description length in characters
const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Maximum external identity length
const MAX_EXTERNAL_ID_LENGTH: usize = 128;

/// Validates and normalizes an external identity.
pub fn validate_external_id(raw: Option<&str>) -> Result<String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(TodoError::invalid_input("externalId required"));
    }
    if value.chars().count() > MAX_EXTERNAL_ID_LENGTH {
        return Err(TodoError::invalid_input(format!(
            "externalId too long (max: {MAX_EXTERNAL_ID_LENGTH})"
        )));
    }
    Ok(value.to_string())
}

/// Validates a task title. Titles are trimmed and must not be empty.
pub fn validate_title(raw: Option<&str>) -> Result<String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(TodoError::invalid_input("title required"));
    }
    if value.chars().count() > MAX_TITLE_LENGTH {
        return Err(TodoError::invalid_input(format!(
            "title too long (max: {MAX_TITLE_LENGTH})"
        )));
    }
    Ok(value.to_string())
}

pub fn validate_description(raw: &str) -> Result<String> {
    if raw.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TodoError::invalid_input(format!(
            "description too long (max: {MAX_DESCRIPTION_LENGTH})"
        )));
    }
    Ok(raw.to_string())
}

/// Reads a priority from JSON. Accepts integers, integral floats and numeric
/// strings; `null` means the default priority 0.
pub fn parse_priority(value: &Value) -> Result<i64> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| TodoError::invalid_input(format!("priority must be an integer: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| TodoError::invalid_input(format!("priority must be an integer: {s}"))),
        other => Err(TodoError::invalid_input(format!(
            "priority must be an integer, found: {other}"
        ))),
    }
}

/// Reads a boolean flag from JSON. Accepts `true`/`false`, `0`/`1` and
/// `null` (false).
pub fn parse_flag(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(TodoError::invalid_input(format!(
                "{field} must be a boolean or 0/1, found: {n}"
            ))),
        },
        Value::String(s) => match s.trim() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(TodoError::invalid_input(format!(
                "{field} must be a boolean or 0/1, found: {s}"
            ))),
        },
        other => Err(TodoError::invalid_input(format!(
            "{field} must be a boolean or 0/1, found: {other}"
        ))),
    }
}

/// Reads an optional string field; `null` becomes the empty string.
pub fn parse_text(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        other => Err(TodoError::invalid_input(format!(
            "{field} must be a string, found: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_id_is_trimmed_and_required() {
        assert_eq!(validate_external_id(Some(" 42 ")).unwrap(), "42");
        assert!(validate_external_id(Some("   ")).is_err());
        assert!(validate_external_id(None).is_err());
    }

    #[test]
    fn test_title_validation() {
        assert_eq!(validate_title(Some("  Buy milk ")).unwrap(), "Buy milk");
        assert_eq!(
            validate_title(Some("")).unwrap_err(),
            TodoError::invalid_input("title required")
        );
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_title(Some(&long)).is_err());
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!(parse_priority(&json!(3)).unwrap(), 3);
        assert_eq!(parse_priority(&json!(-1)).unwrap(), -1);
        assert_eq!(parse_priority(&json!("5")).unwrap(), 5);
        assert_eq!(parse_priority(&json!(2.0)).unwrap(), 2);
        assert_eq!(parse_priority(&json!(null)).unwrap(), 0);
        assert!(parse_priority(&json!(2.5)).is_err());
        assert!(parse_priority(&json!("high")).is_err());
        assert!(parse_priority(&json!([1])).is_err());
    }

    #[test]
    fn test_flag_parsing_accepts_falsy_values() {
        assert!(!parse_flag("completed", &json!(0)).unwrap());
        assert!(parse_flag("completed", &json!(1)).unwrap());
        assert!(!parse_flag("completed", &json!(false)).unwrap());
        assert!(parse_flag("completed", &json!("true")).unwrap());
        assert!(!parse_flag("completed", &json!(null)).unwrap());
        assert!(parse_flag("completed", &json!(2)).is_err());
    }

    #[test]
    fn test_text_parsing() {
        assert_eq!(parse_text("description", &json!("x")).unwrap(), "x");
        assert_eq!(parse_text("description", &json!(null)).unwrap(), "");
        assert!(parse_text("description", &json!(5)).is_err());
    }
}
