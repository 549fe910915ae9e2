//! Route definitions for `/invoices`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::invoice;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create
/// GET    /{id}         -> get_by_id
/// DELETE /{id}         -> delete
/// PATCH  /{id}/status  -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(invoice::list).post(invoice::create))
        .route("/{id}", get(invoice::get_by_id).delete(invoice::delete))
        .route("/{id}/status", patch(invoice::update_status))
}
