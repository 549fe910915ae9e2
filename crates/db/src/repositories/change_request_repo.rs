//! Repository for the `change_requests` table.

use portal_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::change_request::{ChangeRequest, UpdateChangeRequest};

const COLUMNS: &str = "id, project_id, requested_by, title, description, category, priority, \
                       status, estimated_hours, actual_hours, hours_deducted, is_complimentary, \
                       completed_at, created_at, updated_at";

/// Validated fields for a new change request.
pub struct NewChangeRequest<'a> {
    pub project_id: DbId,
    pub requested_by: DbId,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub priority: &'a str,
}

/// Provides CRUD operations for change requests.
pub struct ChangeRequestRepo;

impl ChangeRequestRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewChangeRequest<'_>,
    ) -> Result<ChangeRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_requests
                (project_id, requested_by, title, description, category, priority)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(input.project_id)
            .bind(input.requested_by)
            .bind(input.title)
            .bind(input.description)
            .bind(input.category)
            .bind(input.priority)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM change_requests WHERE id = $1");
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Change requests of a project, newest first, optionally filtered by status.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM change_requests
             WHERE project_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(project_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a reviewer update. Entering `completed` stamps `completed_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChangeRequest,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE change_requests SET
                status = COALESCE($2, status),
                priority = COALESCE($3, priority),
                estimated_hours = COALESCE($4, estimated_hours),
                actual_hours = COALESCE($5, actual_hours),
                is_complimentary = COALESCE($6, is_complimentary),
                completed_at = CASE
                    WHEN $2 = 'completed' AND status <> 'completed' THEN NOW()
                    WHEN $2 IS NOT NULL AND $2 <> 'completed' THEN NULL
                    ELSE completed_at
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .bind(input.is_complimentary)
            .fetch_optional(pool)
            .await
    }

    /// Mark `hours` as deducted if nothing has been deducted yet.
    ///
    /// Returns `false` when another request already claimed the deduction.
    pub async fn claim_deduction(
        conn: &mut PgConnection,
        id: DbId,
        hours: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE change_requests SET hours_deducted = $2
             WHERE id = $1 AND COALESCE(hours_deducted, 0) = 0",
        )
        .bind(id)
        .bind(hours)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
