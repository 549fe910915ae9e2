//! Maintenance-plan hour accounting.
//!
//! A plan carries a monthly allotment of included hours plus a pool of
//! purchased hours. Completed billable work draws from the included hours
//! first, then from the purchased pool. Anything beyond both is overage and
//! is booked against included usage, so `included_hours_used` may exceed
//! `monthly_hours`.
//!
//! [`deduction_decision`] holds the guards that decide whether a status
//! change should trigger a deduction at all; [`plan_deduction`] computes
//! what the deduction does to a balance. Neither touches the database.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::workflow::is_completed_status;

/// Hours are tracked to the hundredth.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Balance columns of a maintenance plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanBalance {
    pub monthly_hours: f64,
    pub included_hours_used: f64,
    pub purchased_hours: f64,
}

impl PlanBalance {
    /// Included hours left in the current cycle (never negative).
    pub fn included_remaining(&self) -> f64 {
        round_hours((self.monthly_hours - self.included_hours_used).max(0.0))
    }

    pub fn total_remaining(&self) -> f64 {
        round_hours(self.included_remaining() + self.purchased_hours.max(0.0))
    }

    /// Hours used beyond the monthly allotment this cycle.
    pub fn overage_used(&self) -> f64 {
        round_hours((self.included_hours_used - self.monthly_hours).max(0.0))
    }
}

/// Which pool a deduction was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourSource {
    Included,
    Purchased,
    Mixed,
    Overage,
}

impl HourSource {
    pub fn as_str(self) -> &'static str {
        match self {
            HourSource::Included => "included",
            HourSource::Purchased => "purchased",
            HourSource::Mixed => "mixed",
            HourSource::Overage => "overage",
        }
    }
}

/// The computed effect of deducting hours from a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeductionPlan {
    pub hours: f64,
    pub from_included: f64,
    pub from_purchased: f64,
    pub overage_hours: f64,
    pub source: HourSource,
    pub is_overage: bool,
    pub balance_after: PlanBalance,
}

/// Compute the deduction of `hours` from `balance`.
pub fn plan_deduction(balance: &PlanBalance, hours: f64) -> Result<DeductionPlan, CoreError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Hours to deduct must be a positive number (got {hours})"
        )));
    }
    let hours = round_hours(hours);

    let from_included = hours.min(balance.included_remaining());
    let rest = round_hours(hours - from_included);
    let from_purchased = rest.min(balance.purchased_hours.max(0.0));
    let overage_hours = round_hours(rest - from_purchased);

    let source = match (from_included > 0.0, from_purchased > 0.0) {
        (true, true) => HourSource::Mixed,
        (true, false) => HourSource::Included,
        (false, true) => HourSource::Purchased,
        (false, false) => HourSource::Overage,
    };

    let balance_after = PlanBalance {
        monthly_hours: balance.monthly_hours,
        included_hours_used: round_hours(balance.included_hours_used + from_included + overage_hours),
        purchased_hours: round_hours(balance.purchased_hours - from_purchased),
    };

    Ok(DeductionPlan {
        hours,
        from_included,
        from_purchased,
        overage_hours,
        source,
        is_overage: overage_hours > 0.0,
        balance_after,
    })
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Facts about a work item at the moment its status changes.
#[derive(Debug, Clone, Copy)]
pub struct DeductionCheck<'a> {
    pub previous_status: &'a str,
    pub new_status: &'a str,
    pub hours_deducted: Option<f64>,
    pub actual_hours: Option<f64>,
    pub estimated_hours: Option<f64>,
    /// Active maintenance plan of the item's project, if any.
    pub plan_id: Option<DbId>,
    pub is_complimentary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotCompleted,
    AlreadyCompleted,
    AlreadyDeducted,
    NoHours,
    NoPlan,
    Complimentary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeductionDecision {
    Deduct { plan_id: DbId, hours: f64 },
    Skip(SkipReason),
}

/// Hours to bill for an item: actual hours when recorded, else the estimate.
pub fn billable_hours(actual_hours: Option<f64>, estimated_hours: Option<f64>) -> Option<f64> {
    actual_hours
        .filter(|h| *h > 0.0)
        .or(estimated_hours.filter(|h| *h > 0.0))
}

/// Decide whether a status change should deduct hours from the plan.
pub fn deduction_decision(check: &DeductionCheck<'_>) -> DeductionDecision {
    if !is_completed_status(check.new_status) {
        return DeductionDecision::Skip(SkipReason::NotCompleted);
    }
    if is_completed_status(check.previous_status) {
        return DeductionDecision::Skip(SkipReason::AlreadyCompleted);
    }
    if check.hours_deducted.is_some_and(|h| h != 0.0) {
        return DeductionDecision::Skip(SkipReason::AlreadyDeducted);
    }
    if check.is_complimentary {
        return DeductionDecision::Skip(SkipReason::Complimentary);
    }
    let Some(hours) = billable_hours(check.actual_hours, check.estimated_hours) else {
        return DeductionDecision::Skip(SkipReason::NoHours);
    };
    let Some(plan_id) = check.plan_id else {
        return DeductionDecision::Skip(SkipReason::NoPlan);
    };
    DeductionDecision::Deduct { plan_id, hours }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn balance(monthly: f64, used: f64, purchased: f64) -> PlanBalance {
        PlanBalance {
            monthly_hours: monthly,
            included_hours_used: used,
            purchased_hours: purchased,
        }
    }

    #[test]
    fn draws_from_included_first() {
        let plan = plan_deduction(&balance(10.0, 2.0, 5.0), 3.5).unwrap();
        assert_eq!(plan.source, HourSource::Included);
        assert_eq!(plan.from_included, 3.5);
        assert_eq!(plan.from_purchased, 0.0);
        assert!(!plan.is_overage);
        assert_eq!(plan.balance_after.included_hours_used, 5.5);
        assert_eq!(plan.balance_after.purchased_hours, 5.0);
    }

    #[test]
    fn spills_into_purchased_pool() {
        let plan = plan_deduction(&balance(10.0, 9.0, 5.0), 3.0).unwrap();
        assert_eq!(plan.source, HourSource::Mixed);
        assert_eq!(plan.from_included, 1.0);
        assert_eq!(plan.from_purchased, 2.0);
        assert_eq!(plan.balance_after.included_hours_used, 10.0);
        assert_eq!(plan.balance_after.purchased_hours, 3.0);
    }

    #[test]
    fn purchased_only_when_included_exhausted() {
        let plan = plan_deduction(&balance(10.0, 10.0, 5.0), 1.5).unwrap();
        assert_eq!(plan.source, HourSource::Purchased);
        assert_eq!(plan.balance_after.purchased_hours, 3.5);
    }

    #[test]
    fn overage_is_booked_against_included_usage() {
        let plan = plan_deduction(&balance(10.0, 9.0, 1.0), 4.0).unwrap();
        assert!(plan.is_overage);
        assert_eq!(plan.overage_hours, 2.0);
        assert_eq!(plan.source, HourSource::Mixed);
        assert_eq!(plan.balance_after.included_hours_used, 12.0);
        assert_eq!(plan.balance_after.purchased_hours, 0.0);
        assert_eq!(plan.balance_after.overage_used(), 2.0);
        assert_eq!(plan.balance_after.total_remaining(), 0.0);
    }

    #[test]
    fn empty_plan_is_pure_overage() {
        let plan = plan_deduction(&balance(0.0, 0.0, 0.0), 2.0).unwrap();
        assert_eq!(plan.source, HourSource::Overage);
        assert!(plan.is_overage);
        assert_eq!(plan.overage_hours, 2.0);
    }

    #[test]
    fn fractional_hours_do_not_drift() {
        let plan = plan_deduction(&balance(10.0, 0.0, 0.0), 7.3).unwrap();
        assert!((plan.balance_after.included_remaining() - 2.7).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_hours() {
        let b = balance(10.0, 0.0, 0.0);
        assert_matches!(plan_deduction(&b, 0.0), Err(CoreError::Validation(_)));
        assert_matches!(plan_deduction(&b, -1.0), Err(CoreError::Validation(_)));
        assert_matches!(plan_deduction(&b, f64::NAN), Err(CoreError::Validation(_)));
    }

    fn completing<'a>() -> DeductionCheck<'a> {
        DeductionCheck {
            previous_status: "in_progress",
            new_status: "completed",
            hours_deducted: None,
            actual_hours: Some(2.0),
            estimated_hours: Some(3.0),
            plan_id: Some(7),
            is_complimentary: false,
        }
    }

    #[test]
    fn completion_deducts_actual_hours() {
        assert_eq!(
            deduction_decision(&completing()),
            DeductionDecision::Deduct { plan_id: 7, hours: 2.0 }
        );
    }

    #[test]
    fn falls_back_to_estimate() {
        let check = DeductionCheck {
            actual_hours: None,
            ..completing()
        };
        assert_eq!(
            deduction_decision(&check),
            DeductionDecision::Deduct { plan_id: 7, hours: 3.0 }
        );
    }

    #[test]
    fn zero_hours_deducted_counts_as_not_deducted() {
        let check = DeductionCheck {
            hours_deducted: Some(0.0),
            ..completing()
        };
        assert_matches!(deduction_decision(&check), DeductionDecision::Deduct { .. });
    }

    #[test]
    fn guards_skip_deduction() {
        let cases = [
            (
                DeductionCheck { new_status: "approved", ..completing() },
                SkipReason::NotCompleted,
            ),
            (
                DeductionCheck { previous_status: "completed", ..completing() },
                SkipReason::AlreadyCompleted,
            ),
            (
                DeductionCheck { hours_deducted: Some(2.0), ..completing() },
                SkipReason::AlreadyDeducted,
            ),
            (
                DeductionCheck { is_complimentary: true, ..completing() },
                SkipReason::Complimentary,
            ),
            (
                DeductionCheck { actual_hours: None, estimated_hours: Some(0.0), ..completing() },
                SkipReason::NoHours,
            ),
            (
                DeductionCheck { plan_id: None, ..completing() },
                SkipReason::NoPlan,
            ),
        ];
        for (check, reason) in cases {
            assert_eq!(deduction_decision(&check), DeductionDecision::Skip(reason));
        }
    }

    #[test]
    fn task_done_is_completed_like() {
        let check = DeductionCheck {
            previous_status: "review",
            new_status: "done",
            ..completing()
        };
        assert_matches!(deduction_decision(&check), DeductionDecision::Deduct { .. });
    }
}
