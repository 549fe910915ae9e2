//! Route definitions for the `/projects` resource.
//!
//! Also nests the project-scoped task, change request and maintenance plan
//! routes under `/projects/{project_id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{change_request, maintenance_plan, project, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                      -> list
/// POST   /                                      -> create
/// GET    /{project_id}                          -> get_by_id
/// PATCH  /{project_id}                          -> update
/// DELETE /{project_id}                          -> delete
///
/// GET    /{project_id}/tasks                    -> task::list_by_project
/// POST   /{project_id}/tasks                    -> task::create
/// GET    /{project_id}/change-requests          -> change_request::list_by_project
/// POST   /{project_id}/change-requests          -> change_request::create
/// POST   /{project_id}/maintenance-plans        -> maintenance_plan::create
/// GET    /{project_id}/maintenance-plan         -> maintenance_plan::get_active
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{project_id}",
            get(project::get_by_id)
                .patch(project::update)
                .delete(project::delete),
        )
        .route(
            "/{project_id}/tasks",
            get(task::list_by_project).post(task::create),
        )
        .route(
            "/{project_id}/change-requests",
            get(change_request::list_by_project).post(change_request::create),
        )
        .route(
            "/{project_id}/maintenance-plans",
            post(maintenance_plan::create),
        )
        .route(
            "/{project_id}/maintenance-plan",
            get(maintenance_plan::get_active),
        )
}
