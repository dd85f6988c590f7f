//! # Task Handlers
//!
//! CRUD endpoints for the mini app's task list.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::{timestamp, NewTask, Tags, Task, TaskChanges};
use crate::query_builder::{TaskFilter, TaskQuery};
use crate::utils::serde::deserialize_optional_identity;
use crate::validation;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::extractors::{ApiJson, ApiQuery};
use crate::web::state::AppState;

/// Body of `POST /api/tasks`. Optional fields stay loosely typed until
/// validation so that the error names the offending field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default, alias = "tg_id", deserialize_with = "deserialize_optional_identity")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub priority: Option<Value>,
    #[serde(default, alias = "due_at")]
    pub due_at: Option<Value>,
    #[serde(default, alias = "reminder_at")]
    pub reminder_at: Option<Value>,
}

impl CreateTaskRequest {
    fn into_new_task(self, owner_external_id: &str) -> Result<NewTask> {
        let mut new_task = NewTask::new(owner_external_id, self.title.as_deref().unwrap_or_default())?;

        if let Some(description) = &self.description {
            let text = validation::parse_text("description", description)?;
            new_task = new_task.with_description(validation::validate_description(&text)?);
        }
        if let Some(tags) = &self.tags {
            new_task = new_task.with_tags(Tags::from_json(tags)?);
        }
        if let Some(priority) = &self.priority {
            new_task = new_task.with_priority(validation::parse_priority(priority)?);
        }
        if let Some(due_at) = &self.due_at {
            new_task = new_task.with_due_at(timestamp::parse_optional_input("dueAt", due_at)?);
        }
        if let Some(reminder_at) = &self.reminder_at {
            new_task = new_task
                .with_reminder_at(timestamp::parse_optional_input("reminderAt", reminder_at)?);
        }
        Ok(new_task)
    }
}

/// Query of `GET /api/tasks`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    #[serde(default, alias = "tg_id")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

fn parse_task_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("invalid task id: '{raw}'")))
}

/// Create a task: POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let owner = state
        .verifier
        .verify(request.external_id.as_deref())
        .await?;
    let new_task = request.into_new_task(owner.external_id())?;

    let task = Task::create(&state.pool, new_task, state.clock.now()).await?;
    Ok(Json(TaskResponse { task }))
}

/// List the caller's tasks: GET /api/tasks?externalId=&filter=&q=
pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let owner = state.verifier.verify(query.external_id.as_deref()).await?;
    let filter = TaskFilter::parse_optional(query.filter.as_deref())?;

    let tasks = TaskQuery::for_owner(owner.into_external_id())
        .filter(filter)
        .search(query.q.unwrap_or_default())
        .today(state.clock.today())
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Sparse update: PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&id)?;
    let changes = TaskChanges::from_json(&body)?;

    let task = Task::update(&state.pool, id, &changes).await?;
    Ok(Json(TaskResponse { task }))
}

/// Delete a task: DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_task_id(&id)?;
    Task::delete(&state.pool, id).await?;
    Ok(Json(DeleteResponse { deleted: true }))
}
