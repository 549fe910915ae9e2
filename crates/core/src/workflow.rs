//! Status, category and priority allow-lists for portal work items.
//!
//! Defines the valid values for projects, tasks, change requests and project
//! requests plus the validation helpers the API runs before any write.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

pub const PROJECT_PLANNING: &str = "planning";
pub const PROJECT_IN_PROGRESS: &str = "in_progress";
pub const PROJECT_REVIEW: &str = "review";
pub const PROJECT_COMPLETED: &str = "completed";
pub const PROJECT_ON_HOLD: &str = "on_hold";
pub const PROJECT_CANCELLED: &str = "cancelled";

pub const PROJECT_STATUSES: &[&str] = &[
    PROJECT_PLANNING,
    PROJECT_IN_PROGRESS,
    PROJECT_REVIEW,
    PROJECT_COMPLETED,
    PROJECT_ON_HOLD,
    PROJECT_CANCELLED,
];

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub const TASK_TODO: &str = "todo";
pub const TASK_IN_PROGRESS: &str = "in_progress";
pub const TASK_REVIEW: &str = "review";
pub const TASK_DONE: &str = "done";

pub const TASK_STATUSES: &[&str] = &[TASK_TODO, TASK_IN_PROGRESS, TASK_REVIEW, TASK_DONE];

// ---------------------------------------------------------------------------
// Priorities (tasks and change requests)
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

pub const PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_URGENT];

// ---------------------------------------------------------------------------
// Change requests
// ---------------------------------------------------------------------------

pub const CR_PENDING: &str = "pending";
pub const CR_REVIEWING: &str = "reviewing";
pub const CR_APPROVED: &str = "approved";
pub const CR_IN_PROGRESS: &str = "in_progress";
pub const CR_COMPLETED: &str = "completed";
pub const CR_REJECTED: &str = "rejected";

pub const CHANGE_REQUEST_STATUSES: &[&str] = &[
    CR_PENDING,
    CR_REVIEWING,
    CR_APPROVED,
    CR_IN_PROGRESS,
    CR_COMPLETED,
    CR_REJECTED,
];

pub const CHANGE_REQUEST_CATEGORIES: &[&str] = &["content", "design", "feature", "bug", "other"];

// ---------------------------------------------------------------------------
// Project requests
// ---------------------------------------------------------------------------

pub const PR_SUBMITTED: &str = "submitted";
pub const PR_REVIEWING: &str = "reviewing";
pub const PR_APPROVED: &str = "approved";
pub const PR_DECLINED: &str = "declined";

pub const PROJECT_REQUEST_STATUSES: &[&str] =
    &[PR_SUBMITTED, PR_REVIEWING, PR_APPROVED, PR_DECLINED];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_member(kind: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {kind} '{value}'. Must be one of: {allowed:?}"
        )))
    }
}

pub fn validate_project_status(status: &str) -> Result<(), CoreError> {
    validate_member("project status", status, PROJECT_STATUSES)
}

pub fn validate_task_status(status: &str) -> Result<(), CoreError> {
    validate_member("task status", status, TASK_STATUSES)
}

pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    validate_member("priority", priority, PRIORITIES)
}

pub fn validate_change_request_status(status: &str) -> Result<(), CoreError> {
    validate_member("change request status", status, CHANGE_REQUEST_STATUSES)
}

pub fn validate_change_request_category(category: &str) -> Result<(), CoreError> {
    validate_member("category", category, CHANGE_REQUEST_CATEGORIES)
}

pub fn validate_project_request_status(status: &str) -> Result<(), CoreError> {
    validate_member("project request status", status, PROJECT_REQUEST_STATUSES)
}

/// Whether `status` marks billable work as finished.
pub fn is_completed_status(status: &str) -> bool {
    status == CR_COMPLETED || status == TASK_DONE
}

/// Reject a missing or whitespace-only required field.
pub fn validate_required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

/// Hours recorded on a work item must be finite and non-negative.
pub fn validate_hours(field: &str, hours: f64) -> Result<(), CoreError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field} must be a non-negative number"
        )))
    }
}
