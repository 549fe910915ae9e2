//! Repository for the `tasks` table.

use portal_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::task::{CreateTask, Task, UpdateTask};

const COLUMNS: &str = "id, project_id, title, description, status, priority, assignee_id, \
                       due_date, estimated_hours, actual_hours, is_billable, hours_deducted, \
                       created_at, updated_at";

/// Provides CRUD operations for project tasks.
pub struct TaskRepo;

impl TaskRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        title: &str,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (project_id, title, description, priority, assignee_id, due_date,
                 estimated_hours, is_billable)
             VALUES ($1, $2, $3, COALESCE($4, 'medium'), $5, $6, $7, COALESCE($8, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .bind(input.is_billable)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Tasks of a project, open work first.
    pub async fn list_by_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE project_id = $1
             ORDER BY (status = 'done') ASC, due_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                assignee_id = COALESCE($6, assignee_id),
                due_date = COALESCE($7, due_date),
                estimated_hours = COALESCE($8, estimated_hours),
                actual_hours = COALESCE($9, actual_hours),
                is_billable = COALESCE($10, is_billable)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .bind(input.is_billable)
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
            "UPDATE tasks SET hours_deducted = $2
             WHERE id = $1 AND COALESCE(hours_deducted, 0) = 0",
        )
        .bind(id)
        .bind(hours)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
