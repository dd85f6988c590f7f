//! # Task Tags
//!
//! Tags are an ordered list of strings in the domain and a single
//! comma-delimited column in the store. Conversion happens only here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TodoError};

pub const TAG_DELIMITER: char = ',';

/// Maximum number of tags on a single task
const MAX_TAGS: usize = 50;

/// Ordered, trimmed, non-empty tag values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds tags from individual values. Values are trimmed and blanks are
    /// dropped; a value containing the delimiter is rejected because it could
    /// not survive a round trip through the store.
    pub fn from_values<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags = Vec::new();
        for value in values {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            if value.contains(TAG_DELIMITER) {
                return Err(TodoError::invalid_input(format!(
                    "tag '{value}' must not contain '{TAG_DELIMITER}'"
                )));
            }
            tags.push(value.to_string());
        }
        if tags.len() > MAX_TAGS {
            return Err(TodoError::invalid_input(format!(
                "too many tags: {} (max: {MAX_TAGS})",
                tags.len()
            )));
        }
        Ok(Self(tags))
    }

    /// Reads tags from client JSON: an array of strings, a comma-delimited
    /// string, or `null`.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::String(s) => Self::from_values(s.split(TAG_DELIMITER)),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => values.push(s.as_str()),
                        other => {
                            return Err(TodoError::invalid_input(format!(
                                "tags must be strings, found: {other}"
                            )))
                        }
                    }
                }
                Self::from_values(values)
            }
            other => Err(TodoError::invalid_input(format!(
                "tags must be an array of strings, found: {other}"
            ))),
        }
    }

    /// Reads the stored column. Never fails: anything between delimiters is a
    /// tag once trimmed.
    pub fn from_stored(raw: &str) -> Self {
        Self(
            raw.split(TAG_DELIMITER)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn to_stored(&self) -> String {
        self.0.join(&TAG_DELIMITER.to_string())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
