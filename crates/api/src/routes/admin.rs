//! Route definitions for `/admin`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{admin, organization};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /users                -> list_users
/// POST   /users                -> create_user
/// GET    /users/{id}           -> get_user
/// PATCH  /users/{id}           -> update_user
/// DELETE /users/{id}           -> deactivate_user
///
/// GET    /organizations        -> list
/// POST   /organizations        -> create
/// GET    /organizations/{id}   -> get_by_id
/// PATCH  /organizations/{id}   -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route(
            "/organizations",
            get(organization::list).post(organization::create),
        )
        .route(
            "/organizations/{id}",
            get(organization::get_by_id).patch(organization::update),
        )
}
