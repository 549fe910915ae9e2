//! Handlers for `/project-requests` (new-project enquiries from clients).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::pagination::{clamp_limit, clamp_offset};
use portal_core::policy::Action;
use portal_core::slug::slugify;
use portal_core::types::DbId;
use portal_core::workflow::{validate_project_request_status, validate_required};
use portal_db::models::project::{CreateProject, Project};
use portal_db::models::project_request::{
    CreateProjectRequest, ProjectRequest, UpdateProjectRequestStatus,
};
use portal_db::repositories::project_request_repo::NewProjectRequest;
use portal_db::repositories::{ProjectRepo, ProjectRequestRepo};
use portal_events::NotificationMessage;
use serde::Serialize;

use crate::access::{ensure_org_access, org_scope};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::notify::notify_user;
use crate::query::{PaginationParams, DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of converting a request into a project.
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub project_request: ProjectRequest,
    pub project: Project,
}

/// GET /api/v1/project-requests
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ProjectRequest>>>> {
    let scope = org_scope(&user)?;
    let data = ProjectRequestRepo::list(
        &state.pool,
        scope,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/project-requests
///
/// Clients submit for their own organization. Internal users submitting on
/// a client's behalf must name the organization.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectRequest>)> {
    user.authorize(Action::SubmitRequests)?;

    let title = validate_required("title", input.title.as_deref())?;
    let description = validate_required("description", input.description.as_deref())?;

    let organization_id = input
        .organization_id
        .or(user.organization_id)
        .ok_or_else(|| AppError::Core(CoreError::Validation("organization_id is required".into())))?;
    ensure_org_access(&user, organization_id)?;

    let request = ProjectRequestRepo::create(
        &state.pool,
        &NewProjectRequest {
            organization_id,
            requested_by: user.user_id,
            title,
            description,
            budget_range: input.budget_range.as_deref(),
            timeline: input.timeline.as_deref(),
        },
    )
    .await?;

    tracing::info!(project_request_id = request.id, organization_id, "Project request submitted");
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/v1/project-requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectRequest>> {
    let request = find_request(&state, id).await?;
    ensure_org_access(&user, request.organization_id)?;
    Ok(Json(request))
}

/// PATCH /api/v1/project-requests/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProjectRequestStatus>,
) -> AppResult<Json<ProjectRequest>> {
    user.authorize(Action::ReviewProjectRequests)?;
    let status = validate_required("status", input.status.as_deref())?;
    validate_project_request_status(status)?;

    let before = find_request(&state, id).await?;
    let request = ProjectRequestRepo::update_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectRequest",
            id,
        }))?;

    if before.status != request.status {
        notify_requester(&state, &request).await;
    }
    Ok(Json(request))
}

/// POST /api/v1/project-requests/{id}/convert
///
/// Create a project from the request and mark the request approved.
pub async fn convert(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<ConversionResponse>)> {
    user.authorize(Action::ReviewProjectRequests)?;
    user.authorize(Action::ManageProjects)?;

    let already_converted = || {
        AppError::Core(CoreError::Conflict(format!(
            "Project request {id} has already been converted"
        )))
    };

    // Locked until commit; the project and the link commit together.
    let mut tx = state.pool.begin().await?;
    let request = ProjectRequestRepo::lock_in(&mut tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectRequest",
            id,
        }))?;
    if request.converted_project_id.is_some() {
        return Err(already_converted());
    }

    let slug = slugify(&request.title);
    let project = ProjectRepo::create_in(
        &mut tx,
        &CreateProject {
            organization_id: request.organization_id,
            name: Some(request.title.clone()),
            description: Some(request.description.clone()),
            status: None,
        },
        &request.title,
        if slug.is_empty() { "project" } else { &slug },
    )
    .await?;

    let project_request = ProjectRequestRepo::mark_converted_in(&mut tx, id, project.id)
        .await?
        .ok_or_else(already_converted)?;
    tx.commit().await?;

    tracing::info!(project_request_id = id, project_id = project.id, "Project request converted");
    notify_requester(&state, &project_request).await;

    Ok((
        StatusCode::CREATED,
        Json(ConversionResponse {
            project_request,
            project,
        }),
    ))
}

async fn find_request(state: &AppState, id: DbId) -> AppResult<ProjectRequest> {
    ProjectRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectRequest",
            id,
        }))
}

async fn notify_requester(state: &AppState, request: &ProjectRequest) {
    let Some(requester) = request.requested_by else {
        return;
    };
    notify_user(
        state,
        requester,
        NotificationMessage {
            title: format!("Project request {}", request.status),
            body: format!(
                "Your project request \"{}\" is now {}.",
                request.title, request.status
            ),
            link: Some(format!("/project-requests/{}", request.id)),
        },
    )
    .await;
}
