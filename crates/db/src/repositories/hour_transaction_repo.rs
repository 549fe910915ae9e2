//! Repository for the `hour_transactions` ledger.
//!
//! Rows are only ever written inside a plan balance transaction, so the
//! insert takes a connection rather than the pool.

use portal_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::maintenance_plan::{HourTransaction, NewHourTransaction};

const COLUMNS: &str =
    "id, plan_id, kind, hours, source, is_overage, description, created_by, created_at";

pub struct HourTransactionRepo;

impl HourTransactionRepo {
    /// Append a ledger entry on the caller's transaction.
    pub async fn record_in(
        conn: &mut PgConnection,
        input: &NewHourTransaction<'_>,
    ) -> Result<HourTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO hour_transactions
                (plan_id, kind, hours, source, is_overage, description, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HourTransaction>(&query)
            .bind(input.plan_id)
            .bind(input.kind)
            .bind(input.hours)
            .bind(input.source)
            .bind(input.is_overage)
            .bind(input.description)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Ledger entries for a plan, newest first.
    pub async fn list_for_plan(
        pool: &PgPool,
        plan_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<HourTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hour_transactions
             WHERE plan_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, HourTransaction>(&query)
            .bind(plan_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
