//! Handlers for the `/projects` resource.
//!
//! Clients see only their organization's projects; mutations need
//! [`Action::ManageProjects`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::pagination::{clamp_limit, clamp_offset};
use portal_core::policy::Action;
use portal_core::slug::slugify;
use portal_core::types::DbId;
use portal_core::workflow::{validate_project_status, validate_required};
use portal_db::models::project::{CreateProject, Project, UpdateProject};
use portal_db::repositories::ProjectRepo;

use crate::access::{load_project_for, org_scope};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::{PaginationParams, DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    user.authorize(Action::ManageProjects)?;

    let name = validate_required("name", input.name.as_deref())?;
    if let Some(status) = input.status.as_deref() {
        validate_project_status(status)?;
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must contain at least one letter or digit".into(),
        )));
    }

    let project = ProjectRepo::create(&state.pool, &input, name, &slug).await?;
    tracing::info!(project_id = project.id, organization_id = project.organization_id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let scope = org_scope(&user)?;
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let data = ProjectRepo::list(&state.pool, scope, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = load_project_for(&state.pool, &user, id).await?;
    Ok(Json(project))
}

/// PATCH /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    user.authorize(Action::ManageProjects)?;
    if let Some(status) = input.status.as_deref() {
        validate_project_status(status)?;
    }
    if input.name.is_some() {
        validate_required("name", input.name.as_deref())?;
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.authorize(Action::ManageProjects)?;
    if ProjectRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(project_id = id, deleted_by = user.user_id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}
