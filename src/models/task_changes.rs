//! # Task Changes
//!
//! Sparse updates for tasks. Only whitelisted fields can be changed; anything
//! else in the request body is ignored. A field that is present is applied even
//! when its value is falsy, so `{"completed": 0}` un-completes a task and
//! `{"dueAt": null}` clears the due date.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::{Result, TodoError};
use crate::models::tags::Tags;
use crate::models::timestamp;
use crate::validation;

/// Updatable task fields. The order here is the order of the SET clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Tags,
    Priority,
    DueAt,
    Completed,
    ReminderAt,
    ReminderSent,
}

impl TaskField {
    pub const ALL: [TaskField; 8] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Tags,
        TaskField::Priority,
        TaskField::DueAt,
        TaskField::Completed,
        TaskField::ReminderAt,
        TaskField::ReminderSent,
    ];

    /// Wire name used in responses and preferred in requests
    pub fn name(self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Tags => "tags",
            TaskField::Priority => "priority",
            TaskField::DueAt => "dueAt",
            TaskField::Completed => "completed",
            TaskField::ReminderAt => "reminderAt",
            TaskField::ReminderSent => "reminderSent",
        }
    }

    /// Legacy snake_case alias still sent by older clients
    fn alias(self) -> Option<&'static str> {
        match self {
            TaskField::DueAt => Some("due_at"),
            TaskField::ReminderAt => Some("reminder_at"),
            TaskField::ReminderSent => Some("reminder_sent"),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Tags => "tags",
            TaskField::Priority => "priority",
            TaskField::DueAt => "due_at",
            TaskField::Completed => "completed",
            TaskField::ReminderAt => "reminder_at",
            TaskField::ReminderSent => "reminder_sent",
        }
    }

    fn lookup(self, body: &Map<String, Value>) -> Option<&Value> {
        body.get(self.name())
            .or_else(|| self.alias().and_then(|alias| body.get(alias)))
    }
}

/// A single validated change
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Title(String),
    Description(String),
    Tags(Tags),
    Priority(i64),
    DueAt(Option<NaiveDateTime>),
    Completed(bool),
    ReminderAt(Option<NaiveDateTime>),
    ReminderSent(bool),
}

impl FieldChange {
    pub fn field(&self) -> TaskField {
        match self {
            FieldChange::Title(_) => TaskField::Title,
            FieldChange::Description(_) => TaskField::Description,
            FieldChange::Tags(_) => TaskField::Tags,
            FieldChange::Priority(_) => TaskField::Priority,
            FieldChange::DueAt(_) => TaskField::DueAt,
            FieldChange::Completed(_) => TaskField::Completed,
            FieldChange::ReminderAt(_) => TaskField::ReminderAt,
            FieldChange::ReminderSent(_) => TaskField::ReminderSent,
        }
    }

    fn parse(field: TaskField, value: &Value) -> Result<Self> {
        let name = field.name();
        Ok(match field {
            TaskField::Title => {
                let raw = match value {
                    Value::String(s) => Some(s.as_str()),
                    Value::Null => None,
                    other => {
                        return Err(TodoError::invalid_input(format!(
                            "title must be a string, found: {other}"
                        )))
                    }
                };
                FieldChange::Title(validation::validate_title(raw)?)
            }
            TaskField::Description => FieldChange::Description(validation::validate_description(
                &validation::parse_text(name, value)?,
            )?),
            TaskField::Tags => FieldChange::Tags(Tags::from_json(value)?),
            TaskField::Priority => FieldChange::Priority(validation::parse_priority(value)?),
            TaskField::DueAt => FieldChange::DueAt(timestamp::parse_optional_input(name, value)?),
            TaskField::Completed => FieldChange::Completed(validation::parse_flag(name, value)?),
            TaskField::ReminderAt => {
                FieldChange::ReminderAt(timestamp::parse_optional_input(name, value)?)
            }
            TaskField::ReminderSent => {
                FieldChange::ReminderSent(validation::parse_flag(name, value)?)
            }
        })
    }
}

/// Validated set of changes for one task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    changes: Vec<FieldChange>,
}

impl TaskChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts whitelisted fields from a JSON request body.
    ///
    /// Unknown keys are ignored. An empty result is not an error here; the
    /// update itself rejects it.
    pub fn from_json(body: &Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| TodoError::invalid_input("request body must be a JSON object"))?;

        let mut changes = Vec::new();
        for field in TaskField::ALL {
            if let Some(value) = field.lookup(object) {
                changes.push(FieldChange::parse(field, value)?);
            }
        }
        Ok(Self { changes })
    }

    /// Adds or replaces the change for a field.
    pub fn set(mut self, change: FieldChange) -> Self {
        let field = change.field();
        self.changes.retain(|c| c.field() != field);
        self.changes.push(change);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.changes.iter().map(|c| c.field().name()).collect()
    }

    /// Builds `UPDATE tasks SET ... WHERE id = ?` with every value bound.
    /// Column names come from [`TaskField::column`] only.
    pub fn update_query(&self, id: i64) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new("UPDATE tasks SET ");
        {
            let mut set = builder.separated(", ");
            for change in &self.changes {
                set.push(format!("{} = ", change.field().column()));
                match change {
                    FieldChange::Title(v) | FieldChange::Description(v) => {
                        set.push_bind_unseparated(v.clone());
                    }
                    FieldChange::Tags(tags) => {
                        set.push_bind_unseparated(tags.to_stored());
                    }
                    FieldChange::Priority(v) => {
                        set.push_bind_unseparated(*v);
                    }
                    FieldChange::DueAt(v) | FieldChange::ReminderAt(v) => {
                        set.push_bind_unseparated(v.as_ref().map(timestamp::format));
                    }
                    FieldChange::Completed(v) | FieldChange::ReminderSent(v) => {
                        set.push_bind_unseparated(*v);
                    }
                }
            }
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder
    }
}
