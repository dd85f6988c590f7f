//! # ToDo+ Configuration
//!
//! Layered configuration built with the `config` crate:
//!
//! 1. Built-in defaults (the `Default` impls below)
//! 2. `config/todo_plus.toml` if present, or the file named by `TODO_CONFIG`
//!    (which must then exist)
//! 3. Environment variables prefixed `TODO_`, with `__` between section and
//!    key: `TODO_SERVER__PORT=8080`, `TODO_REMINDERS__INTERVAL_SECONDS=30`
//! 4. Deployment shorthands: `BOT_TOKEN`, `PORT`, `DATABASE_URL`, `WEBAPP_URL`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use todo_plus::config::TodoConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TodoConfig::load()?;
//! println!("listening on {}", config.server.bind_address());
//! # Ok(())
//! # }
//! ```

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TodoError};

/// Config file read when `TODO_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "config/todo_plus.toml";

const ENV_PREFIX: &str = "TODO";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub telegram: TelegramConfig,
    pub archival: ArchivalConfig,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://todo.db`
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://todo.db".to_string(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub request_timeout_ms: u64,
    /// Replace 500 response bodies with a generic message
    pub redact_internal_errors: bool,
    /// Directory served for routes the API does not match
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            redact_internal_errors: false,
            static_dir: None,
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: Option<String>,
    pub api_base: String,
    /// Mini-app URL offered by the `/todo` command
    pub webapp_url: String,
    pub poll_timeout_seconds: u64,
    pub retry_delay_seconds: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: None,
            api_base: "https://api.telegram.org".to_string(),
            webapp_url: "https://your-domain-or-ngrok-url".to_string(),
            poll_timeout_seconds: 30,
            retry_delay_seconds: 5,
        }
    }
}

impl TelegramConfig {
    /// Token to use, if the bot is enabled and a non-blank token is set
    pub fn active_token(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchivalConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub retention_days: i64,
}

impl Default for ArchivalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
            retention_days: 30,
        }
    }
}

impl ArchivalConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub max_concurrent_dispatches: usize,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            max_concurrent_dispatches: 8,
        }
    }
}

impl ReminderConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl TodoConfig {
    /// Load from the default file locations and the process environment.
    pub fn load() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let explicit = env.get("TODO_CONFIG").map(PathBuf::from);
        Self::load_from(explicit.as_deref(), &env)
    }

    /// Load from an explicit file (required) or the default file (optional),
    /// with `env` standing in for the process environment.
    pub fn load_from(path: Option<&Path>, env: &HashMap<String, String>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let prefixed: HashMap<String, String> = env
            .iter()
            .filter(|(key, _)| key.starts_with("TODO_") && key.contains("__"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let builder = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(prefixed)),
            )
            .set_override_option("telegram.bot_token", non_blank(env, "BOT_TOKEN"))?
            .set_override_option("server.port", non_blank(env, "PORT"))?
            .set_override_option("database.url", non_blank(env, "DATABASE_URL"))?
            .set_override_option("telegram.webapp_url", non_blank(env, "WEBAPP_URL"))?;

        let config: TodoConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            bind = %config.server.bind_address(),
            database = %config.database.url,
            bot_enabled = config.telegram.active_token().is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reject values that would make the server or its sweeps misbehave.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.server.port == 0 {
            problems.push("server.port must be greater than 0");
        }
        if self.database.url.trim().is_empty() {
            problems.push("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            problems.push("database.max_connections must be greater than 0");
        }
        if self.web.request_timeout_ms == 0 {
            problems.push("web.request_timeout_ms must be greater than 0");
        }
        if self.archival.interval_seconds == 0 {
            problems.push("archival.interval_seconds must be greater than 0");
        }
        if self.archival.retention_days < 0 {
            problems.push("archival.retention_days must not be negative");
        }
        if self.reminders.interval_seconds == 0 {
            problems.push("reminders.interval_seconds must be greater than 0");
        }
        if self.reminders.max_concurrent_dispatches == 0 {
            problems.push("reminders.max_concurrent_dispatches must be greater than 0");
        }
        if self.telegram.poll_timeout_seconds == 0 {
            problems.push("telegram.poll_timeout_seconds must be greater than 0");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(TodoError::ConfigurationError(problems.join("; ")))
        }
    }
}

fn non_blank(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
