//! # Structured Logging Module
//!
//! Environment-aware structured logging: human-readable console output plus a
//! JSON log file for everything that happens off the request path (sweeps and
//! the bot poller).

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();
static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call has an effect. The JSON
/// file layer is added when `TODO_LOG_DIR` is set or in `production` (under
/// `log/`), unless the directory cannot be created.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let pid = process::id();

        let log_path = prepare_log_file(&environment, pid);

        let file_layer = log_path.as_ref().map(|(dir, file_name)| {
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_WRITER_GUARD.set(guard);
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(env_filter(&log_level))
        });

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(env_filter(&log_level)),
            )
            .with(file_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
            return;
        }

        let log_file = log_path
            .as_ref()
            .map(|(dir, file)| dir.join(file).display().to_string());
        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = log_file.as_deref(),
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// `RUST_LOG` wins over the environment default.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn prepare_log_file(environment: &str, pid: u32) -> Option<(PathBuf, String)> {
    let log_dir = match std::env::var("TODO_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ if environment == "production" => PathBuf::from("log"),
        _ => return None,
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!(
            "todo-plus: cannot create log directory {}: {e}; logging to console only",
            log_dir.display()
        );
        return None;
    }

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    Some((log_dir, format!("{environment}.{pid}.{timestamp}.log")))
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("TODO_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for task mutations
pub fn log_task_operation(
    operation: &str,
    task_id: Option<i64>,
    owner_external_id: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = task_id,
        owner = owner_external_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 TASK_OPERATION"
    );
}

/// Log structured data for identity registration
pub fn log_identity_operation(operation: &str, external_id: &str, status: &str) {
    tracing::info!(
        operation = %operation,
        external_id = %external_id,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "👤 IDENTITY_OPERATION"
    );
}

/// Log the outcome of one sweep run
pub fn log_sweep_operation(sweep: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        sweep = %sweep,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🧹 SWEEP_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
