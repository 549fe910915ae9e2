//! JWT-based authentication extractor for Axum handlers.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use portal_core::error::CoreError;
use portal_core::policy::{self, Action};
use portal_core::roles::Role;
use portal_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::auth::session::{sync_role, RoleSource, RoleSync};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The role and organization are re-read from the store on every request;
/// see [`crate::auth::session`].
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     user.authorize(Action::ManageBlog)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<DbId>,
    pub role_source: RoleSource,
}

impl AuthUser {
    /// Whether the policy table allows this user to perform `action`.
    pub fn can(&self, action: Action) -> bool {
        policy::is_permitted(self.role, action)
    }

    /// Reject with 403 unless the policy table allows `action`.
    pub fn authorize(&self, action: Action) -> AppResult<()> {
        policy::authorize(self.role, action)?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let claim_role: Role = claims.role.parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let (role, organization_id, role_source) = match sync_role(&state.pool, claims.sub).await
        {
            RoleSync::Current {
                role,
                organization_id,
            } => (role, organization_id, RoleSource::Store),
            RoleSync::Revoked => {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Account is no longer active".into(),
                )));
            }
            RoleSync::Unavailable => (claim_role, claims.org, RoleSource::Token),
        };

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role,
            organization_id,
            role_source,
        })
    }
}

/// `Option<AuthUser>` for routes that are public but show more to signed-in
/// users. A missing `Authorization` header yields `None`; a present but
/// invalid one is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key("authorization") {
            return Ok(None);
        }
        <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
