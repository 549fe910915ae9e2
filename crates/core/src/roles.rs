//! Portal roles.
//!
//! The string forms must match the CHECK constraint on `users.role` in
//! `20260301000002_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_CLIENT: &str = "client";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_STAFF, ROLE_CLIENT];

/// A portal user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Staff,
    Client,
}

/// Role assigned to new accounts and used when a sign-in lookup fails.
pub const DEFAULT_ROLE: Role = Role::Client;

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
            Role::Admin => ROLE_ADMIN,
            Role::Staff => ROLE_STAFF,
            Role::Client => ROLE_CLIENT,
        }
    }

    /// Agency-side roles. Clients are the only external role.
    pub fn is_internal(self) -> bool {
        !matches!(self, Role::Client)
    }

    /// Whether this role outranks or equals `Admin`.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_SUPER_ADMIN => Ok(Role::SuperAdmin),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_STAFF => Ok(Role::Staff),
            ROLE_CLIENT => Ok(Role::Client),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {VALID_ROLES:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_forms_round_trip() {
        for name in VALID_ROLES {
            let role: Role = name.parse().expect("valid role");
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("owner".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn only_client_is_external() {
        assert!(Role::SuperAdmin.is_internal());
        assert!(Role::Staff.is_internal());
        assert!(!Role::Client.is_internal());
        assert!(!Role::Staff.is_admin());
    }

    #[test]
    fn display_matches_stored_name() {
        assert_eq!(Role::SuperAdmin.to_string(), "super_admin");
        assert_eq!(DEFAULT_ROLE.to_string(), "client");
    }
}
