//! # Query Builder
//!
//! Builds the read query behind the task list: owner restriction, a named
//! filter, free-text search and a fixed sort order.
//!
//! ## Key Components
//!
//! - [`filter`] - the named list filters (`all`, `active`, `completed`, `today`)
//! - [`builder`] - [`TaskQuery`], which turns a filter and search text into SQL
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use todo_plus::query_builder::{TaskFilter, TaskQuery};
//!
//! let tasks = TaskQuery::for_owner("42")
//!     .filter(TaskFilter::Today)
//!     .search("groceries")
//!     .today(clock.today())
//!     .fetch_all(&pool)
//!     .await?;
//! ```
//!
//! User values only ever reach the database as bound parameters; SQL text is
//! assembled from fixed fragments.

pub mod builder;
pub mod filter;

pub use builder::TaskQuery;
pub use filter::TaskFilter;
