//! Change request model and DTOs.
//!
//! Change requests are raised by clients against a project and reviewed by
//! agency staff. Completing one bills its hours to the project's active
//! maintenance plan.

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `change_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeRequest {
    pub id: DbId,
    pub project_id: DbId,
    pub requested_by: Option<DbId>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub hours_deducted: Option<f64>,
    pub is_complimentary: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a change request. `title` and `description` are
/// required; they are `Option` so a missing field yields a 400, not a 422.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChangeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// Reviewer-side update. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChangeRequest {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub is_complimentary: Option<bool>,
}

/// Query parameters for listing change requests.
#[derive(Debug, Deserialize)]
pub struct ChangeRequestListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
