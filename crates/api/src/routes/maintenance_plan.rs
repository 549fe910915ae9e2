//! Route definitions for `/maintenance-plans`.
//!
//! Creation and the active-plan lookup live under `/projects/{project_id}`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::maintenance_plan;
use crate::state::AppState;

/// Routes mounted at `/maintenance-plans`.
///
/// ```text
/// GET   /{id}               -> get_by_id
/// PATCH /{id}               -> update
/// POST  /{id}/purchase      -> purchase
/// POST  /{id}/reset-cycle   -> reset_cycle
/// POST  /{id}/deduct        -> deduct
/// GET   /{id}/transactions  -> list_transactions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(maintenance_plan::get_by_id).patch(maintenance_plan::update),
        )
        .route("/{id}/purchase", post(maintenance_plan::purchase))
        .route("/{id}/reset-cycle", post(maintenance_plan::reset_cycle))
        .route("/{id}/deduct", post(maintenance_plan::deduct))
        .route(
            "/{id}/transactions",
            get(maintenance_plan::list_transactions),
        )
}
