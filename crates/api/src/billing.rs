//! Hour deduction triggered by completed work.
//!
//! When a task or change request moves into a completed status, its billable
//! hours are charged to the project's active maintenance plan. The item's
//! `hours_deducted` marker and the plan balance change commit together, so
//! repeating the status change (or racing it) never deducts twice.
//!
//! Deduction is a side effect of the status update: any failure is logged
//! and the update still succeeds.

use portal_core::hours::{deduction_decision, DeductionCheck, DeductionDecision};
use portal_core::types::DbId;
use portal_core::workflow::is_completed_status;
use portal_db::models::maintenance_plan::HourDeduction;
use portal_db::repositories::{ChangeRequestRepo, MaintenancePlanRepo, TaskRepo};
use portal_db::DbPool;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemKind {
    Task,
    ChangeRequest,
}

impl WorkItemKind {
    fn label(self) -> &'static str {
        match self {
            WorkItemKind::Task => "Task",
            WorkItemKind::ChangeRequest => "Change request",
        }
    }
}

/// A work item whose status just changed.
#[derive(Debug, Clone, Copy)]
pub struct WorkItem<'a> {
    pub kind: WorkItemKind,
    pub id: DbId,
    pub project_id: DbId,
    pub title: &'a str,
    pub previous_status: &'a str,
    pub new_status: &'a str,
    pub hours_deducted: Option<f64>,
    pub actual_hours: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub is_complimentary: bool,
}

/// Deduct the item's hours if the status change calls for it.
///
/// Returns the deduction when one happened. Never fails.
pub async fn apply_completion_deduction(
    pool: &DbPool,
    item: &WorkItem<'_>,
    actor: Option<DbId>,
) -> Option<HourDeduction> {
    if !is_completed_status(item.new_status) || is_completed_status(item.previous_status) {
        return None;
    }

    match try_deduct(pool, item, actor).await {
        Ok(deduction) => deduction,
        Err(e) => {
            tracing::warn!(
                kind = item.kind.label(),
                item_id = item.id,
                error = %e,
                "Hour deduction failed; status update kept",
            );
            None
        }
    }
}

async fn try_deduct(
    pool: &DbPool,
    item: &WorkItem<'_>,
    actor: Option<DbId>,
) -> AppResult<Option<HourDeduction>> {
    let plan = MaintenancePlanRepo::find_active_for_project(pool, item.project_id).await?;

    let check = DeductionCheck {
        previous_status: item.previous_status,
        new_status: item.new_status,
        hours_deducted: item.hours_deducted,
        actual_hours: item.actual_hours,
        estimated_hours: item.estimated_hours,
        plan_id: plan.map(|p| p.id),
        is_complimentary: item.is_complimentary,
    };

    let (plan_id, hours) = match deduction_decision(&check) {
        DeductionDecision::Deduct { plan_id, hours } => (plan_id, hours),
        DeductionDecision::Skip(reason) => {
            tracing::debug!(
                kind = item.kind.label(),
                item_id = item.id,
                ?reason,
                "Skipping hour deduction",
            );
            return Ok(None);
        }
    };

    let mut tx = pool.begin().await?;

    let claimed = match item.kind {
        WorkItemKind::Task => TaskRepo::claim_deduction(&mut tx, item.id, hours).await?,
        WorkItemKind::ChangeRequest => {
            ChangeRequestRepo::claim_deduction(&mut tx, item.id, hours).await?
        }
    };
    if !claimed {
        tracing::debug!(item_id = item.id, "Hours already deducted by another request");
        return Ok(None);
    }

    let description = format!("{} #{}: {}", item.kind.label(), item.id, item.title);
    let deduction =
        MaintenancePlanRepo::deduct_hours_in(&mut tx, plan_id, hours, &description, actor).await?;
    tx.commit().await?;

    tracing::info!(
        kind = item.kind.label(),
        item_id = item.id,
        plan_id,
        hours = deduction.deducted,
        source = deduction.source.as_str(),
        is_overage = deduction.is_overage,
        "Deducted hours for completed work",
    );
    Ok(Some(deduction))
}
