//! New-project request model and DTOs.

use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectRequest {
    pub id: DbId,
    pub organization_id: DbId,
    pub requested_by: Option<DbId>,
    pub title: String,
    pub description: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub status: String,
    pub converted_project_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    /// Internal users submitting on a client's behalf must name the organization.
    pub organization_id: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectRequestStatus {
    pub status: Option<String>,
}
