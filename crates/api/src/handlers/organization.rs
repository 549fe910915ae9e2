//! Handlers for `/admin/organizations` (client tenants).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::policy::Action;
use portal_core::slug::{slugify, validate_slug};
use portal_core::types::DbId;
use portal_core::workflow::validate_required;
use portal_db::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use portal_db::repositories::OrganizationRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/organizations
///
/// The slug is derived from the name unless one is supplied.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateOrganization>,
) -> AppResult<(StatusCode, Json<Organization>)> {
    user.authorize(Action::ManageOrganizations)?;

    let name = validate_required("name", input.name.as_deref())?;
    let slug = match input.slug.as_deref() {
        Some(s) => s.to_string(),
        None => slugify(name),
    };
    validate_slug(&slug)?;

    let org = OrganizationRepo::create(&state.pool, name, &slug).await?;
    tracing::info!(organization_id = org.id, slug = %org.slug, "Organization created");
    Ok((StatusCode::CREATED, Json(org)))
}

/// GET /api/v1/admin/organizations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Organization>>>> {
    user.authorize(Action::ManageOrganizations)?;
    let data = OrganizationRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/organizations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Organization>> {
    user.authorize(Action::ManageOrganizations)?;
    let org = OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }))?;
    Ok(Json(org))
}

/// PATCH /api/v1/admin/organizations/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateOrganization>,
) -> AppResult<Json<Organization>> {
    user.authorize(Action::ManageOrganizations)?;
    if input.name.is_some() {
        validate_required("name", input.name.as_deref())?;
    }
    let org = OrganizationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }))?;
    Ok(Json(org))
}
