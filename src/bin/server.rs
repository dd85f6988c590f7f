//! # ToDo+ Server
//!
//! Runs the REST API, the background sweeps and, when a bot token is
//! configured, the Telegram command poller.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin todo-plus-server
//!
//! # Run with a bot token and a custom port
//! BOT_TOKEN=123:abc PORT=8080 cargo run --bin todo-plus-server
//! ```

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use todo_plus::bot::poller::{BotCommandPoller, BotPollerConfig};
use todo_plus::clock::{SharedClock, SystemClock};
use todo_plus::config::TodoConfig;
use todo_plus::database::DatabaseConnection;
use todo_plus::identity::TrustingVerifier;
use todo_plus::logging;
use todo_plus::notifications::{TelegramClient, TelegramSink};
use todo_plus::sweeps::{ArchivalSweep, ReminderSweep, ScheduledSweep, SweepScheduler};
use todo_plus::web::{create_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!("🚀 Starting ToDo+ Server...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));

    let config = TodoConfig::load().context("failed to load configuration")?;

    let db = DatabaseConnection::connect(&config.database)
        .await
        .context("failed to open database")?;
    db.migrate().await.context("failed to apply migrations")?;
    let pool = db.pool().clone();

    let clock: SharedClock = Arc::new(SystemClock);

    let telegram = match config.telegram.active_token() {
        Some(token) => Some(
            TelegramClient::new(&config.telegram.api_base, token)
                .context("failed to build Telegram client")?,
        ),
        None => {
            warn!("No bot token configured, reminders and bot commands are disabled");
            None
        }
    };

    let archival = ArchivalSweep::new(pool.clone(), clock.clone(), config.archival.retention_days);
    let mut sweeps = vec![ScheduledSweep::new(
        Arc::new(archival),
        config.archival.interval(),
        config.archival.enabled,
    )];
    if let Some(client) = &telegram {
        let reminders = ReminderSweep::new(
            pool.clone(),
            clock.clone(),
            Arc::new(TelegramSink::new(client.clone())),
            config.reminders.max_concurrent_dispatches,
        );
        sweeps.push(ScheduledSweep::new(
            Arc::new(reminders),
            config.reminders.interval(),
            config.reminders.enabled,
        ));
    }
    let mut scheduler = SweepScheduler::new(sweeps);
    scheduler.start();

    let mut poller = telegram.map(|client| {
        let mut poller = BotCommandPoller::new(client, BotPollerConfig::from(&config.telegram));
        poller.start();
        poller
    });

    let state = AppState::new(
        pool.clone(),
        clock,
        Arc::new(TrustingVerifier),
        config.web.clone(),
    );
    let app = create_app(state);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("🎉 ToDo+ Server listening on {address}");
    info!("   Press Ctrl+C to shutdown gracefully");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("🛑 Shutdown signal received, stopping background work...");
    scheduler.stop();
    if let Some(poller) = poller.as_mut() {
        poller.stop();
    }
    db.close().await;

    if let Err(e) = served {
        error!("Server exited with error: {e}");
        return Err(e.into());
    }

    info!("👋 ToDo+ Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
