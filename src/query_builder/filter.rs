use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TodoError;

/// Named task list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
    /// Due today in the local timezone
    Today,
}

impl TaskFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
            TaskFilter::Today => "today",
        }
    }

    /// Parses an optional query parameter; missing or blank means `all`.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, TodoError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(TaskFilter::All),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "active" => Ok(TaskFilter::Active),
            "completed" => Ok(TaskFilter::Completed),
            "today" => Ok(TaskFilter::Today),
            other => Err(TodoError::invalid_input(format!(
                "unknown filter '{other}' (expected one of: all, active, completed, today)"
            ))),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
