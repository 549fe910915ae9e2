//! Route definitions for `/change-requests`.

use axum::routing::get;
use axum::Router;

use crate::handlers::change_request;
use crate::state::AppState;

/// Routes mounted at `/change-requests`.
///
/// ```text
/// GET   /{id}  -> get_by_id
/// PATCH /{id}  -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(change_request::get_by_id).patch(change_request::update),
    )
}
