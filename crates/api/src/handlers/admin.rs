//! Handlers for `/admin/users` (user management).
//!
//! All handlers require a role allowed to manage users via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::roles::{Role, DEFAULT_ROLE};
use portal_core::types::DbId;
use portal_core::workflow::validate_required;
use portal_db::models::user::{CreateUser, UpdateUser, UserResponse};
use portal_db::repositories::{OrganizationRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Defaults to `client`.
    pub role: Option<String>,
    pub organization_id: Option<DbId>,
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let name = validate_required("name", input.name.as_deref())?;
    let email = validate_required("email", input.email.as_deref())?;
    let password = input.password.as_deref().unwrap_or_default();
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = match input.role.as_deref() {
        Some(r) => r.parse::<Role>()?,
        None => DEFAULT_ROLE,
    };
    ensure_can_grant(&admin, role)?;
    if let Some(org_id) = input.organization_id {
        ensure_organization_exists(&state, org_id).await?;
    }

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            role: role.as_str().to_string(),
            organization_id: input.organization_id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role, created_by = admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user.into()))
}

/// PATCH /api/v1/admin/users/{id}
///
/// Change a user's name, role, organization or active flag. Role changes
/// take effect on the user's next request.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if let Some(role) = input.role.as_deref() {
        ensure_can_grant(&admin, role.parse::<Role>()?)?;
    }
    if let Some(org_id) = input.organization_id {
        ensure_organization_exists(&state, org_id).await?;
    }
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::BadRequest("You cannot deactivate your own account".into()));
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");
    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user. Their next request is rejected with 401.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("You cannot deactivate your own account".into()));
    }
    if UserRepo::deactivate(&state.pool, id).await? {
        tracing::info!(user_id = id, deactivated_by = admin.user_id, "User deactivated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

/// Only a super admin may hand out the super admin role.
fn ensure_can_grant(granter: &AuthUser, role: Role) -> AppResult<()> {
    if role == Role::SuperAdmin && granter.role != Role::SuperAdmin {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only a super admin can grant the super_admin role".into(),
        )));
    }
    Ok(())
}

async fn ensure_organization_exists(state: &AppState, id: DbId) -> AppResult<()> {
    OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }))
}
