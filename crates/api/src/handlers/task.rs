//! Handlers for project tasks.
//!
//! Tasks are agency-side work items; clients may read the tasks of their own
//! projects. Moving a billable task to `done` charges its hours to the
//! project's maintenance plan (see [`crate::billing`]).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::policy::Action;
use portal_core::types::DbId;
use portal_core::workflow::{
    validate_hours, validate_priority, validate_required, validate_task_status,
};
use portal_db::models::maintenance_plan::HourDeduction;
use portal_db::models::task::{CreateTask, Task, UpdateTask};
use portal_db::repositories::TaskRepo;
use serde::Serialize;

use crate::access::load_project_for;
use crate::billing::{apply_completion_deduction, WorkItem, WorkItemKind};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A task after an update, with the hour deduction it triggered (if any).
#[derive(Debug, Serialize)]
pub struct TaskUpdateResponse {
    #[serde(flatten)]
    pub task: Task,
    pub hour_deduction: Option<HourDeduction>,
}

/// GET /api/v1/projects/{project_id}/tasks
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    load_project_for(&state.pool, &user, project_id).await?;
    let data = TaskRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{project_id}/tasks
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppJson(input): AppJson<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    user.authorize(Action::ManageTasks)?;
    load_project_for(&state.pool, &user, project_id).await?;

    let title = validate_required("title", input.title.as_deref())?;
    if let Some(priority) = input.priority.as_deref() {
        validate_priority(priority)?;
    }
    if let Some(hours) = input.estimated_hours {
        validate_hours("estimated_hours", hours)?;
    }

    let task = TaskRepo::create(&state.pool, project_id, title, &input).await?;
    tracing::info!(task_id = task.id, project_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateTask>,
) -> AppResult<Json<TaskUpdateResponse>> {
    user.authorize(Action::ManageTasks)?;

    if let Some(status) = input.status.as_deref() {
        validate_task_status(status)?;
    }
    if let Some(priority) = input.priority.as_deref() {
        validate_priority(priority)?;
    }
    if input.title.is_some() {
        validate_required("title", input.title.as_deref())?;
    }
    if let Some(hours) = input.estimated_hours {
        validate_hours("estimated_hours", hours)?;
    }
    if let Some(hours) = input.actual_hours {
        validate_hours("actual_hours", hours)?;
    }

    let before = find_task(&state, id).await?;
    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    let hour_deduction = apply_completion_deduction(
        &state.pool,
        &WorkItem {
            kind: WorkItemKind::Task,
            id: task.id,
            project_id: task.project_id,
            title: &task.title,
            previous_status: &before.status,
            new_status: &task.status,
            hours_deducted: task.hours_deducted,
            actual_hours: task.actual_hours,
            estimated_hours: task.estimated_hours,
            is_complimentary: !task.is_billable,
        },
        Some(user.user_id),
    )
    .await;

    let task = match &hour_deduction {
        Some(deduction) => Task {
            hours_deducted: Some(deduction.deducted),
            ..task
        },
        None => task,
    };

    Ok(Json(TaskUpdateResponse {
        task,
        hour_deduction,
    }))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.authorize(Action::ManageTasks)?;
    if TaskRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Task", id }))
    }
}

async fn find_task(state: &AppState, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))
}
