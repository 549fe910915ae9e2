pub mod admin;
pub mod auth;
pub mod blog;
pub mod change_request;
pub mod health;
pub mod invoice;
pub mod maintenance_plan;
pub mod notification;
pub mod project;
pub mod project_request;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                                   register (public, toggleable)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current identity
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update, deactivate
/// /admin/organizations                             list, create (admin only)
/// /admin/organizations/{id}                        get, update
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{project_id}/tasks                     list, create
/// /projects/{project_id}/change-requests           list, create
/// /projects/{project_id}/maintenance-plans         create
/// /projects/{project_id}/maintenance-plan          active plan
///
/// /tasks/{id}                                      update, delete
///
/// /change-requests/{id}                            get, update
///
/// /project-requests                                list, create
/// /project-requests/{id}                           get
/// /project-requests/{id}/status                    update status
/// /project-requests/{id}/convert                   convert to project
///
/// /maintenance-plans/{id}                          get, update
/// /maintenance-plans/{id}/purchase                 add purchased hours
/// /maintenance-plans/{id}/reset-cycle              start a new cycle
/// /maintenance-plans/{id}/deduct                   manual deduction
/// /maintenance-plans/{id}/transactions             hour ledger
///
/// /invoices                                        list, create
/// /invoices/{id}                                   get, delete (draft only)
/// /invoices/{id}/status                            update status
///
/// /blog                                            list (public), create
/// /blog/{slug}                                     get (public)
/// /blog/posts/{id}                                 update, delete
///
/// /notifications                                   list own
/// /notifications/{id}/read                         mark read
/// /notifications/read-all                          mark all read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/change-requests", change_request::router())
        .nest("/project-requests", project_request::router())
        .nest("/maintenance-plans", maintenance_plan::router())
        .nest("/invoices", invoice::router())
        .nest("/blog", blog::router())
        .nest("/notifications", notification::router())
}
