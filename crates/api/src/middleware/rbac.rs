//! Role-based access control (RBAC) extractors.
//!
//! [`RequireAdmin`] wraps [`AuthUser`] for the user-management routes.
//! Other handlers call [`AuthUser::authorize`] with their own action.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use portal_core::policy::Action;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role allowed to manage users (`super_admin` or `admin`).
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        user.authorize(Action::ManageUsers)?;
        Ok(RequireAdmin(user))
    }
}
