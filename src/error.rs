//! Error types for the ToDo+ core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TodoError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TodoError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        TodoError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        TodoError::NotFound(message.into())
    }

    /// True for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TodoError::InvalidInput(_) | TodoError::NotFound(_))
    }
}

impl From<sqlx::Error> for TodoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => TodoError::NotFound("not found".to_string()),
            other => TodoError::DatabaseError(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for TodoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        TodoError::DatabaseError(format!("migration failed: {err}"))
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        TodoError::InvalidInput(format!("JSON serialization error: {err}"))
    }
}

impl From<config::ConfigError> for TodoError {
    fn from(err: config::ConfigError) -> Self {
        TodoError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
