//! Role policy table.
//!
//! Every role-gated operation names an [`Action`]; [`permitted_roles`] is the
//! one place that maps actions to the roles allowed to perform them. Handlers
//! call [`authorize`] instead of carrying their own role lists.

use crate::error::CoreError;
use crate::roles::Role;

/// An operation that requires a particular role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageUsers,
    ManageOrganizations,
    /// Read projects outside the caller's own organization.
    ViewAllProjects,
    ManageProjects,
    ManageTasks,
    ManageInvoices,
    ReviewChangeRequests,
    ReviewProjectRequests,
    ManageMaintenancePlans,
    ManageBlog,
    /// Submit change requests and project requests.
    SubmitRequests,
}

const ADMINS: &[Role] = &[Role::SuperAdmin, Role::Admin];
const INTERNAL: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Staff];
const EVERYONE: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Staff, Role::Client];

/// Roles permitted to perform `action`.
pub fn permitted_roles(action: Action) -> &'static [Role] {
    match action {
        Action::ManageUsers
        | Action::ManageOrganizations
        | Action::ManageProjects
        | Action::ManageInvoices
        | Action::ReviewProjectRequests
        | Action::ManageMaintenancePlans
        | Action::ManageBlog => ADMINS,
        Action::ViewAllProjects | Action::ManageTasks | Action::ReviewChangeRequests => INTERNAL,
        Action::SubmitRequests => EVERYONE,
    }
}

pub fn is_permitted(role: Role, action: Action) -> bool {
    permitted_roles(action).contains(&role)
}

/// Reject with [`CoreError::Forbidden`] unless `role` may perform `action`.
pub fn authorize(role: Role, action: Action) -> Result<(), CoreError> {
    if is_permitted(role, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' is not permitted to perform {action:?}"
        )))
    }
}
