//! Route definitions for `/blog`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::blog;
use crate::state::AppState;

/// Routes mounted at `/blog`.
///
/// ```text
/// GET    /             -> list (public)
/// POST   /             -> create
/// GET    /{slug}       -> get_by_slug (public)
/// PATCH  /posts/{id}   -> update
/// DELETE /posts/{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::list).post(blog::create))
        .route("/{slug}", get(blog::get_by_slug))
        .route("/posts/{id}", patch(blog::update).delete(blog::delete))
}
