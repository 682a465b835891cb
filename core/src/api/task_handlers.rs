use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::blocking::run_blocking;
use crate::api::envelope::{ApiResponse, ApiResult};
use crate::api::extract::{CurrentUser, JsonBody};
use crate::api::AppState;
use crate::model::task::{Task, TaskSummary};
use crate::service::dto::{
    ChangeStatusInput, CreateTaskInput, EditTaskInput, OverdueCount, TaskCount, ToggleChecklistInput,
};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SortQuery {
    pub time_frame: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PriorityQuery {
    pub priority: Option<String>,
}

pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(input): JsonBody<CreateTaskInput>,
) -> ApiResult<Task> {
    let tasks = state.tasks.clone();
    let task = run_blocking(move || tasks.create_task(&actor, input)).await?;
    Ok(ApiResponse::created(task, "Task created successfully"))
}

pub async fn edit_task(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(task_id): Path<String>,
    JsonBody(input): JsonBody<EditTaskInput>,
) -> ApiResult<Task> {
    let tasks = state.tasks.clone();
    let task = run_blocking(move || tasks.edit_task(&actor, &task_id, input)).await?;
    Ok(ApiResponse::ok(task, "Task updated successfully"))
}

pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(task_id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let tasks = state.tasks.clone();
    run_blocking(move || tasks.delete_task(&actor, &task_id)).await?;
    Ok(ApiResponse::ok(serde_json::json!({}), "Task deleted successfully"))
}

pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((task_id, checklist_id)): Path<(String, String)>,
    JsonBody(input): JsonBody<ToggleChecklistInput>,
) -> ApiResult<Task> {
    let tasks = state.tasks.clone();
    let task = run_blocking(move || {
        tasks.toggle_checklist_item(&actor, &task_id, &checklist_id, input.is_completed)
    })
    .await?;
    Ok(ApiResponse::ok(task, "Checklist item updated successfully"))
}

pub async fn change_task_status(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(task_id): Path<String>,
    JsonBody(input): JsonBody<ChangeStatusInput>,
) -> ApiResult<Task> {
    let tasks = state.tasks.clone();
    let task = run_blocking(move || tasks.change_task_status(&actor, &task_id, input)).await?;
    Ok(ApiResponse::ok(task, "Task status updated successfully"))
}

pub async fn get_tasks(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<SortQuery>,
) -> ApiResult<Vec<TaskSummary>> {
    let tasks = state.tasks.clone();
    let found = run_blocking(move || tasks.get_tasks(&actor, query.time_frame.as_deref())).await?;
    Ok(ApiResponse::ok(found, "Tasks fetched successfully"))
}

pub async fn get_tasks_by_status(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<StatusQuery>,
) -> ApiResult<TaskCount> {
    let tasks = state.tasks.clone();
    let count = run_blocking(move || tasks.get_tasks_by_status(&actor, query.status.as_deref())).await?;
    Ok(ApiResponse::ok(count, count_message(count.total_task)))
}

pub async fn get_tasks_by_priority(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<PriorityQuery>,
) -> ApiResult<TaskCount> {
    let tasks = state.tasks.clone();
    let count = run_blocking(move || tasks.get_tasks_by_priority(&actor, query.priority.as_deref())).await?;
    Ok(ApiResponse::ok(count, count_message(count.total_task)))
}

pub async fn get_overdue_tasks_count(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> ApiResult<OverdueCount> {
    let tasks = state.tasks.clone();
    let count = run_blocking(move || tasks.get_overdue_tasks_count(&actor)).await?;
    Ok(ApiResponse::ok(count, count_message(count.overdue_tasks)))
}

/// Readable without a session.
pub async fn get_task_by_id(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Task> {
    let tasks = state.tasks.clone();
    let task = run_blocking(move || tasks.get_task_by_id(&task_id)).await?;
    Ok(ApiResponse::ok(task, "Task fetched successfully"))
}

fn count_message(count: u64) -> &'static str {
    if count == 0 {
        "No tasks found"
    } else {
        "Tasks fetched successfully"
    }
}
