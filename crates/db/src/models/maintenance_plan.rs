//! Maintenance plan and hour ledger models.

use portal_core::hours::{HourSource, PlanBalance};
use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const KIND_DEDUCTION: &str = "deduction";
pub const KIND_PURCHASE: &str = "purchase";
pub const KIND_CYCLE_RESET: &str = "cycle_reset";

/// A row from the `maintenance_plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenancePlan {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub monthly_hours: f64,
    pub included_hours_used: f64,
    pub purchased_hours: f64,
    pub is_active: bool,
    pub cycle_started_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MaintenancePlan {
    pub fn balance(&self) -> PlanBalance {
        PlanBalance {
            monthly_hours: self.monthly_hours,
            included_hours_used: self.included_hours_used,
            purchased_hours: self.purchased_hours,
        }
    }
}

/// Plan plus its derived balance figures, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenancePlanSummary {
    #[serde(flatten)]
    pub plan: MaintenancePlan,
    pub included_remaining: f64,
    pub total_remaining: f64,
    pub overage_used: f64,
}

impl From<MaintenancePlan> for MaintenancePlanSummary {
    fn from(plan: MaintenancePlan) -> Self {
        let balance = plan.balance();
        Self {
            included_remaining: balance.included_remaining(),
            total_remaining: balance.total_remaining(),
            overage_used: balance.overage_used(),
            plan,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaintenancePlan {
    pub name: Option<String>,
    pub monthly_hours: f64,
    pub purchased_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMaintenancePlan {
    pub name: Option<String>,
    pub monthly_hours: Option<f64>,
    pub is_active: Option<bool>,
}

/// Body for purchase and manual deduction endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct HoursInput {
    pub hours: f64,
    pub description: Option<String>,
}

/// A row from the `hour_transactions` table.
///
/// `hours` is signed: deductions are negative, purchases positive, cycle
/// resets record the usage that was cleared as a positive amount.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HourTransaction {
    pub id: DbId,
    pub plan_id: DbId,
    pub kind: String,
    pub hours: f64,
    pub source: Option<String>,
    pub is_overage: bool,
    pub description: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// A ledger entry about to be written.
#[derive(Debug, Clone, Copy)]
pub struct NewHourTransaction<'a> {
    pub plan_id: DbId,
    pub kind: &'a str,
    pub hours: f64,
    pub source: Option<&'a str>,
    pub is_overage: bool,
    pub description: &'a str,
    pub created_by: Option<DbId>,
}

/// Outcome of a successful hour deduction.
#[derive(Debug, Clone, Serialize)]
pub struct HourDeduction {
    pub plan_id: DbId,
    pub deducted: f64,
    pub source: HourSource,
    pub is_overage: bool,
    pub overage_hours: f64,
    pub balance_after: PlanBalance,
}
