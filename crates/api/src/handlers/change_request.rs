//! Handlers for change requests.
//!
//! Anyone who can see a project may submit and read its change requests.
//! Reviewing (status, hours, complimentary flag) needs
//! [`Action::ReviewChangeRequests`]. Entering `completed` triggers the hour
//! deduction and notifies the requester.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::pagination::{clamp_limit, clamp_offset};
use portal_core::policy::Action;
use portal_core::types::DbId;
use portal_core::workflow::{
    validate_change_request_category, validate_change_request_status, validate_hours,
    validate_priority, validate_required, PRIORITY_MEDIUM,
};
use portal_db::models::change_request::{
    ChangeRequest, ChangeRequestListParams, CreateChangeRequest, UpdateChangeRequest,
};
use portal_db::models::maintenance_plan::HourDeduction;
use portal_db::repositories::change_request_repo::NewChangeRequest;
use portal_db::repositories::ChangeRequestRepo;
use portal_events::NotificationMessage;
use serde::Serialize;

use crate::access::load_project_for;
use crate::billing::{apply_completion_deduction, WorkItem, WorkItemKind};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::notify::notify_user;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_CATEGORY: &str = "other";

/// A change request after review, with the hour deduction it triggered.
#[derive(Debug, Serialize)]
pub struct ChangeRequestUpdateResponse {
    #[serde(flatten)]
    pub change_request: ChangeRequest,
    pub hour_deduction: Option<HourDeduction>,
}

/// GET /api/v1/projects/{project_id}/change-requests
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<ChangeRequestListParams>,
) -> AppResult<Json<DataResponse<Vec<ChangeRequest>>>> {
    load_project_for(&state.pool, &user, project_id).await?;
    if let Some(status) = params.status.as_deref() {
        validate_change_request_status(status)?;
    }
    let data = ChangeRequestRepo::list_by_project(
        &state.pool,
        project_id,
        params.status.as_deref(),
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{project_id}/change-requests
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppJson(input): AppJson<CreateChangeRequest>,
) -> AppResult<(StatusCode, Json<ChangeRequest>)> {
    user.authorize(Action::SubmitRequests)?;
    load_project_for(&state.pool, &user, project_id).await?;

    let title = validate_required("title", input.title.as_deref())?;
    let description = validate_required("description", input.description.as_deref())?;
    let category = input.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
    validate_change_request_category(category)?;
    let priority = input.priority.as_deref().unwrap_or(PRIORITY_MEDIUM);
    validate_priority(priority)?;

    let cr = ChangeRequestRepo::create(
        &state.pool,
        &NewChangeRequest {
            project_id,
            requested_by: user.user_id,
            title,
            description,
            category,
            priority,
        },
    )
    .await?;

    tracing::info!(
        change_request_id = cr.id,
        project_id,
        requested_by = user.user_id,
        "Change request submitted",
    );
    Ok((StatusCode::CREATED, Json(cr)))
}

/// GET /api/v1/change-requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ChangeRequest>> {
    let cr = find_change_request(&state, id).await?;
    load_project_for(&state.pool, &user, cr.project_id).await?;
    Ok(Json(cr))
}

/// PATCH /api/v1/change-requests/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateChangeRequest>,
) -> AppResult<Json<ChangeRequestUpdateResponse>> {
    user.authorize(Action::ReviewChangeRequests)?;

    if let Some(status) = input.status.as_deref() {
        validate_change_request_status(status)?;
    }
    if let Some(priority) = input.priority.as_deref() {
        validate_priority(priority)?;
    }
    if let Some(hours) = input.estimated_hours {
        validate_hours("estimated_hours", hours)?;
    }
    if let Some(hours) = input.actual_hours {
        validate_hours("actual_hours", hours)?;
    }

    let before = find_change_request(&state, id).await?;
    let cr = ChangeRequestRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ChangeRequest",
            id,
        }))?;

    let hour_deduction = apply_completion_deduction(
        &state.pool,
        &WorkItem {
            kind: WorkItemKind::ChangeRequest,
            id: cr.id,
            project_id: cr.project_id,
            title: &cr.title,
            previous_status: &before.status,
            new_status: &cr.status,
            hours_deducted: cr.hours_deducted,
            actual_hours: cr.actual_hours,
            estimated_hours: cr.estimated_hours,
            is_complimentary: cr.is_complimentary,
        },
        Some(user.user_id),
    )
    .await;

    if before.status != cr.status {
        if let Some(requester) = cr.requested_by {
            notify_user(
                &state,
                requester,
                NotificationMessage {
                    title: format!("Change request {}", cr.status.replace('_', " ")),
                    body: format!(
                        "Your change request \"{}\" is now {}.",
                        cr.title,
                        cr.status.replace('_', " ")
                    ),
                    link: Some(format!("/change-requests/{}", cr.id)),
                },
            )
            .await;
        }
    }

    let change_request = match &hour_deduction {
        Some(deduction) => ChangeRequest {
            hours_deducted: Some(deduction.deducted),
            ..cr
        },
        None => cr,
    };

    Ok(Json(ChangeRequestUpdateResponse {
        change_request,
        hour_deduction,
    }))
}

async fn find_change_request(state: &AppState, id: DbId) -> AppResult<ChangeRequest> {
    ChangeRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ChangeRequest",
            id,
        }))
}
