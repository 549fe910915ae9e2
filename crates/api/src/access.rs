//! Organization scoping for client users.
//!
//! Internal roles see every organization. Clients only see rows that belong
//! to their own organization; anything else is a 403.

use portal_core::error::CoreError;
use portal_core::policy::Action;
use portal_core::types::DbId;
use portal_db::models::project::Project;
use portal_db::repositories::ProjectRepo;
use portal_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Reject unless `user` may see data owned by `organization_id`.
pub fn ensure_org_access(user: &AuthUser, organization_id: DbId) -> AppResult<()> {
    if user.can(Action::ViewAllProjects) || user.organization_id == Some(organization_id) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this organization's data".into(),
        )))
    }
}

/// The organization filter to apply to list queries for `user`.
///
/// `None` means unfiltered. Clients without an organization get an error
/// rather than an unfiltered list.
pub fn org_scope(user: &AuthUser) -> AppResult<Option<DbId>> {
    if user.can(Action::ViewAllProjects) {
        return Ok(None);
    }
    user.organization_id.map(Some).ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "Your account is not linked to an organization".into(),
        ))
    })
}

/// Load a live project and check that `user` may see it.
pub async fn load_project_for(
    pool: &DbPool,
    user: &AuthUser,
    project_id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    ensure_org_access(user, project.organization_id)?;
    Ok(project)
}
