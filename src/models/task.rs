//! # Task Model
//!
//! Tasks owned by a chat-platform identity.
//!
//! ## Database Schema
//!
//! Maps to the `tasks` table:
//! - `id`: surrogate key (INTEGER, autoincrement)
//! - `owner_external_id`: the owner's `users.external_id` (not `users.id`)
//! - `tags`: comma-delimited text, see [`Tags`]
//! - `due_at` / `created_at` / `reminder_at`: `YYYY-MM-DD HH:MM:SS` local time
//! - `completed` / `reminder_sent`: 0/1 flags, independent of each other
//!
//! Every two-step operation (insert then re-select, update then re-select,
//! existence check then delete) runs inside one transaction.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, Sqlite, SqlitePool};

use crate::error::{Result, TodoError};
use crate::logging::log_task_operation;
use crate::models::tags::Tags;
use crate::models::task_changes::TaskChanges;
use crate::models::timestamp;
use crate::validation;

pub(crate) const TASK_COLUMNS: &str = "id, owner_external_id, title, description, tags, priority, \
     due_at, created_at, completed, reminder_at, reminder_sent";

/// A task as exposed to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub owner_external_id: String,
    pub title: String,
    pub description: String,
    pub tags: Tags,
    pub priority: i64,
    #[serde(serialize_with = "timestamp::serialize_optional")]
    pub due_at: Option<NaiveDateTime>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: NaiveDateTime,
    pub completed: bool,
    #[serde(serialize_with = "timestamp::serialize_optional")]
    pub reminder_at: Option<NaiveDateTime>,
    pub reminder_sent: bool,
}

/// Raw `tasks` row before the store-boundary conversions
#[derive(Debug, FromRow)]
pub(crate) struct TaskRow {
    id: i64,
    owner_external_id: String,
    title: String,
    description: String,
    tags: String,
    priority: i64,
    due_at: Option<String>,
    created_at: String,
    completed: bool,
    reminder_at: Option<String>,
    reminder_sent: bool,
}

impl TryFrom<TaskRow> for Task {
    type Error = TodoError;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Task {
            id: row.id,
            owner_external_id: row.owner_external_id,
            title: row.title,
            description: row.description,
            tags: Tags::from_stored(&row.tags),
            priority: row.priority,
            due_at: row.due_at.as_deref().map(timestamp::parse_stored).transpose()?,
            created_at: timestamp::parse_stored(&row.created_at)?,
            completed: row.completed,
            reminder_at: row
                .reminder_at
                .as_deref()
                .map(timestamp::parse_stored)
                .transpose()?,
            reminder_sent: row.reminder_sent,
        })
    }
}

/// New task for creation (without generated fields)
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub owner_external_id: String,
    pub title: String,
    pub description: String,
    pub tags: Tags,
    pub priority: i64,
    pub due_at: Option<NaiveDateTime>,
    pub reminder_at: Option<NaiveDateTime>,
}

impl NewTask {
    /// Start a new task with defaults for every optional field.
    pub fn new(owner_external_id: &str, title: &str) -> Result<Self> {
        Ok(Self {
            owner_external_id: validation::validate_external_id(Some(owner_external_id))?,
            title: validation::validate_title(Some(title))?,
            description: String::new(),
            tags: Tags::new(),
            priority: 0,
            due_at: None,
            reminder_at: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_at(mut self, due_at: Option<NaiveDateTime>) -> Self {
        self.due_at = due_at;
        self
    }

    pub fn with_reminder_at(mut self, reminder_at: Option<NaiveDateTime>) -> Self {
        self.reminder_at = reminder_at;
        self
    }
}

impl Task {
    /// Create a new task and return the stored record
    pub async fn create(pool: &SqlitePool, new_task: NewTask, now: NaiveDateTime) -> Result<Task> {
        let owner = validation::validate_external_id(Some(&new_task.owner_external_id))?;
        let title = validation::validate_title(Some(&new_task.title))?;

        let mut tx = pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO tasks (
                owner_external_id, title, description, tags, priority,
                due_at, created_at, completed, reminder_at, reminder_sent
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, 0)
            "#,
        )
        .bind(&owner)
        .bind(&title)
        .bind(&new_task.description)
        .bind(new_task.tags.to_stored())
        .bind(new_task.priority)
        .bind(new_task.due_at.as_ref().map(timestamp::format))
        .bind(timestamp::format(&now))
        .bind(new_task.reminder_at.as_ref().map(timestamp::format))
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let task = Self::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| TodoError::Internal(format!("task {id} missing after insert")))?;

        tx.commit().await?;

        log_task_operation("create", Some(task.id), Some(&task.owner_external_id), "created", None);
        Ok(task)
    }

    /// Find a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Task>>
    where
        E: sqlx::Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        row.map(Task::try_from).transpose()
    }

    /// Apply a whitelisted partial update and return the updated record.
    ///
    /// Fails with `InvalidInput` when no whitelisted field is present and with
    /// `NotFound` when no row has the given id.
    pub async fn update(pool: &SqlitePool, id: i64, changes: &TaskChanges) -> Result<Task> {
        if changes.is_empty() {
            return Err(TodoError::invalid_input("no fields to update"));
        }

        let mut tx = pool.begin().await?;

        let mut query = changes.update_query(id);
        let affected = query.build().execute(&mut *tx).await?.rows_affected();
        if affected == 0 {
            return Err(TodoError::not_found(format!("task {id} not found")));
        }

        let task = Self::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| TodoError::not_found(format!("task {id} not found")))?;

        tx.commit().await?;

        log_task_operation(
            "update",
            Some(id),
            Some(&task.owner_external_id),
            "updated",
            Some(&changes.field_names().join(",")),
        );
        Ok(task)
    }

    /// Delete a task after checking that it exists
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
        let mut tx = pool.begin().await?;

        let owner = sqlx::query_scalar::<_, String>("SELECT owner_external_id FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| TodoError::not_found(format!("task {id} not found")))?;

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log_task_operation("delete", Some(id), Some(&owner), "deleted", None);
        Ok(())
    }

    /// Incomplete tasks whose reminder is due and not yet sent
    pub async fn due_for_reminder(pool: &SqlitePool, now: NaiveDateTime) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE reminder_at IS NOT NULL \
               AND reminder_sent = 0 \
               AND completed = 0 \
               AND datetime(reminder_at) <= datetime(?) \
             ORDER BY reminder_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(timestamp::format(&now))
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    /// Flag a reminder as delivered. Returns false if the task vanished or was
    /// already flagged in the meantime.
    pub async fn mark_reminder_sent(pool: &SqlitePool, id: i64) -> Result<bool> {
        let affected = sqlx::query("UPDATE tasks SET reminder_sent = 1 WHERE id = ? AND reminder_sent = 0")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Delete completed tasks created at or before `cutoff`. Incomplete tasks
    /// are never touched.
    pub async fn delete_completed_created_before(
        pool: &SqlitePool,
        cutoff: NaiveDateTime,
    ) -> Result<u64> {
        let deleted = sqlx::query(
            "DELETE FROM tasks WHERE completed = 1 AND datetime(created_at) <= datetime(?)",
        )
        .bind(timestamp::format(&cutoff))
        .execute(pool)
        .await?
        .rows_affected();
        Ok(deleted)
    }
}
