#![allow(clippy::doc_markdown)] // Allow technical terms like SQLite, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # ToDo+ Backend
//!
//! Task backend for the ToDo+ Telegram mini app.
//!
//! ## Overview
//!
//! Each user is identified by an opaque external id (their Telegram user id).
//! Users own tasks with a title, description, tags, priority, optional due
//! and reminder times, and a completion flag. Tasks live in SQLite and are
//! served over a small JSON REST API. Two background sweeps keep the store
//! tidy: completed tasks past the retention window are archived (deleted),
//! and due reminders are delivered through the Telegram Bot API.
//!
//! ## Module Organization
//!
//! - [`models`] - Identities, tasks, tags and the sparse-update whitelist
//! - [`query_builder`] - Owner-scoped listing with filter, search and sort
//! - [`database`] - SQLite pool and embedded migrations
//! - [`sweeps`] - Archival and reminder sweeps plus their scheduler
//! - [`notifications`] - Notification sink contract and the Telegram client
//! - [`bot`] - `/start` and `/todo` command handling over long polling
//! - [`web`] - Axum REST API
//! - [`config`] - Layered configuration (defaults, file, environment)
//! - [`logging`] - Structured logging setup and operation log helpers
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use todo_plus::database::DatabaseConnection;
//! use todo_plus::models::{NewTask, Task};
//! use todo_plus::clock::{Clock, SystemClock};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::in_memory().await?;
//! db.migrate().await?;
//!
//! let new_task = NewTask::new("12345", "Buy milk")?.with_priority(2);
//! let task = Task::create(db.pool(), new_task, SystemClock.now()).await?;
//! println!("created task {}", task.id);
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod query_builder;
pub mod sweeps;
pub mod test_utils;
pub mod utils;
pub mod validation;
pub mod web;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::TodoConfig;
pub use database::DatabaseConnection;
pub use error::{Result, TodoError};
pub use models::{Identity, NewIdentity, NewTask, Tags, Task, TaskChanges, TaskField};
pub use query_builder::{TaskFilter, TaskQuery};
