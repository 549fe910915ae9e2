//! Repository for the `project_requests` table.

use portal_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::project_request::ProjectRequest;

const COLUMNS: &str = "id, organization_id, requested_by, title, description, budget_range, \
                       timeline, status, converted_project_id, created_at, updated_at";

/// Validated fields for a new project request.
pub struct NewProjectRequest<'a> {
    pub organization_id: DbId,
    pub requested_by: DbId,
    pub title: &'a str,
    pub description: &'a str,
    pub budget_range: Option<&'a str>,
    pub timeline: Option<&'a str>,
}

pub struct ProjectRequestRepo;

impl ProjectRequestRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewProjectRequest<'_>,
    ) -> Result<ProjectRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_requests
                (organization_id, requested_by, title, description, budget_range, timeline)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(input.organization_id)
            .bind(input.requested_by)
            .bind(input.title)
            .bind(input.description)
            .bind(input.budget_range)
            .bind(input.timeline)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_requests WHERE id = $1");
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Newest first; scoped to one organization when `organization_id` is `Some`.
    pub async fn list(
        pool: &PgPool,
        organization_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_requests
             WHERE ($1::BIGINT IS NULL OR organization_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(organization_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<ProjectRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE project_requests SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Load a request and lock its row until the transaction ends.
    pub async fn lock_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ProjectRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Mark a request approved and link the project created from it.
    ///
    /// Returns `None` if the request was already converted.
    pub async fn mark_converted_in(
        conn: &mut PgConnection,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<ProjectRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE project_requests
             SET status = 'approved', converted_project_id = $2
             WHERE id = $1 AND converted_project_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRequest>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(conn)
            .await
    }
}
