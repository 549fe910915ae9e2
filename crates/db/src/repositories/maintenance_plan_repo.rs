//! Repository for `maintenance_plans`.
//!
//! Every balance change locks the plan row (`SELECT ... FOR UPDATE`) and
//! writes the `hour_transactions` entry in the same transaction, so concurrent
//! deductions against one plan serialize instead of losing updates.

use portal_core::error::CoreError;
use portal_core::hours::{plan_deduction, round_hours};
use portal_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::maintenance_plan::{
    CreateMaintenancePlan, HourDeduction, MaintenancePlan, NewHourTransaction,
    UpdateMaintenancePlan, KIND_CYCLE_RESET, KIND_DEDUCTION, KIND_PURCHASE,
};
use crate::repositories::HourTransactionRepo;

const COLUMNS: &str = "id, project_id, name, monthly_hours, included_hours_used, \
                       purchased_hours, is_active, cycle_started_at, created_at, updated_at";

/// Why an hour deduction did not happen.
#[derive(Debug, thiserror::Error)]
pub enum DeductionError {
    #[error("Maintenance plan {0} not found")]
    PlanNotFound(DbId),

    #[error("Maintenance plan {0} is not active")]
    PlanInactive(DbId),

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Provides plan CRUD and balance operations.
pub struct MaintenancePlanRepo;

impl MaintenancePlanRepo {
    /// Insert a plan. A second active plan for the same project violates
    /// `uq_maintenance_plans_active_project`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        name: &str,
        input: &CreateMaintenancePlan,
    ) -> Result<MaintenancePlan, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_plans (project_id, name, monthly_hours, purchased_hours)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(project_id)
            .bind(name)
            .bind(input.monthly_hours)
            .bind(input.purchased_hours)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MaintenancePlan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_plans WHERE id = $1");
        sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The active plan of a project, if any.
    pub async fn find_active_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<MaintenancePlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_plans WHERE project_id = $1 AND is_active = true"
        );
        sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMaintenancePlan,
    ) -> Result<Option<MaintenancePlan>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_plans SET
                name = COALESCE($2, name),
                monthly_hours = COALESCE($3, monthly_hours),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.monthly_hours)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    async fn lock(conn: &mut PgConnection, id: DbId) -> Result<MaintenancePlan, DeductionError> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_plans WHERE id = $1 FOR UPDATE");
        let plan = sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(DeductionError::PlanNotFound(id))?;
        if !plan.is_active {
            return Err(DeductionError::PlanInactive(id));
        }
        Ok(plan)
    }

    /// Deduct `hours` from a plan on an existing connection/transaction.
    ///
    /// The caller owns the transaction; nothing is committed here.
    pub async fn deduct_hours_in(
        conn: &mut PgConnection,
        plan_id: DbId,
        hours: f64,
        description: &str,
        created_by: Option<DbId>,
    ) -> Result<HourDeduction, DeductionError> {
        let plan = Self::lock(&mut *conn, plan_id).await?;
        let outcome = plan_deduction(&plan.balance(), hours)?;

        sqlx::query(
            "UPDATE maintenance_plans
             SET included_hours_used = $2, purchased_hours = $3
             WHERE id = $1",
        )
        .bind(plan_id)
        .bind(outcome.balance_after.included_hours_used)
        .bind(outcome.balance_after.purchased_hours)
        .execute(&mut *conn)
        .await?;

        HourTransactionRepo::record_in(
            &mut *conn,
            &NewHourTransaction {
                plan_id,
                kind: KIND_DEDUCTION,
                hours: -outcome.hours,
                source: Some(outcome.source.as_str()),
                is_overage: outcome.is_overage,
                description,
                created_by,
            },
        )
        .await?;

        Ok(HourDeduction {
            plan_id,
            deducted: outcome.hours,
            source: outcome.source,
            is_overage: outcome.is_overage,
            overage_hours: outcome.overage_hours,
            balance_after: outcome.balance_after,
        })
    }

    /// Deduct `hours` from a plan in its own transaction.
    pub async fn deduct_hours(
        pool: &PgPool,
        plan_id: DbId,
        hours: f64,
        description: &str,
        created_by: Option<DbId>,
    ) -> Result<HourDeduction, DeductionError> {
        let mut tx = pool.begin().await?;
        let deduction =
            Self::deduct_hours_in(&mut tx, plan_id, hours, description, created_by).await?;
        tx.commit().await?;
        Ok(deduction)
    }

    /// Add purchased hours to a plan.
    pub async fn purchase_hours(
        pool: &PgPool,
        plan_id: DbId,
        hours: f64,
        description: &str,
        created_by: Option<DbId>,
    ) -> Result<MaintenancePlan, DeductionError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(CoreError::Validation("Purchased hours must be a positive number".into()).into());
        }
        let hours = round_hours(hours);
        let mut tx = pool.begin().await?;
        Self::lock(&mut tx, plan_id).await?;

        let query = format!(
            "UPDATE maintenance_plans SET purchased_hours = purchased_hours + $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let plan = sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(plan_id)
            .bind(hours)
            .fetch_one(&mut *tx)
            .await?;

        HourTransactionRepo::record_in(
            &mut tx,
            &NewHourTransaction {
                plan_id,
                kind: KIND_PURCHASE,
                hours,
                source: None,
                is_overage: false,
                description,
                created_by,
            },
        )
        .await?;
        tx.commit().await?;
        Ok(plan)
    }

    /// Start a new billing cycle: clear included usage and stamp the cycle start.
    pub async fn reset_cycle(
        pool: &PgPool,
        plan_id: DbId,
        created_by: Option<DbId>,
    ) -> Result<MaintenancePlan, DeductionError> {
        let mut tx = pool.begin().await?;
        let before = Self::lock(&mut tx, plan_id).await?;

        let query = format!(
            "UPDATE maintenance_plans
             SET included_hours_used = 0, cycle_started_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let plan = sqlx::query_as::<_, MaintenancePlan>(&query)
            .bind(plan_id)
            .fetch_one(&mut *tx)
            .await?;

        HourTransactionRepo::record_in(
            &mut tx,
            &NewHourTransaction {
                plan_id,
                kind: KIND_CYCLE_RESET,
                hours: before.included_hours_used,
                source: None,
                is_overage: false,
                description: "Billing cycle reset",
                created_by,
            },
        )
        .await?;
        tx.commit().await?;
        Ok(plan)
    }
}
