//! Route definitions for `/project-requests`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::project_request;
use crate::state::AppState;

/// Routes mounted at `/project-requests`.
///
/// ```text
/// GET   /               -> list
/// POST  /               -> create
/// GET   /{id}           -> get_by_id
/// PATCH /{id}/status    -> update_status
/// POST  /{id}/convert   -> convert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project_request::list).post(project_request::create))
        .route("/{id}", get(project_request::get_by_id))
        .route("/{id}/status", patch(project_request::update_status))
        .route("/{id}/convert", post(project_request::convert))
}
