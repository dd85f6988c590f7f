//! # Data Models
//!
//! Domain records and their persistence. Each model owns its SQL; conversion
//! between the store's text columns and domain types happens at the row
//! boundary (`*Row` structs) and nowhere else.

pub mod identity;
pub mod tags;
pub mod task;
pub mod task_changes;
pub mod timestamp;

pub use identity::{Identity, NewIdentity};
pub use tags::Tags;
pub use task::{NewTask, Task};
pub use task_changes::{FieldChange, TaskChanges, TaskField};
