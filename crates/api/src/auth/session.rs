//! Role synchronization between access-token claims and the user store.
//!
//! The role in a token is a snapshot from sign-in. Every authenticated
//! request re-reads the role from `users` so promotions, demotions and
//! deactivations take effect without waiting for the token to expire.
//! A failing lookup never fails the request: the token claim is kept and
//! the outcome is recorded as [`RoleSource::Token`].

use portal_core::roles::{Role, DEFAULT_ROLE, ROLE_ADMIN};
use portal_core::types::DbId;
use portal_db::models::user::RoleRecord;
use portal_db::repositories::UserRepo;
use portal_db::DbPool;
use serde::Serialize;

use crate::config::ServerConfig;

/// Where the role attached to a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSource {
    /// Read from the user store during this request.
    Store,
    /// Taken from the token claim because the store could not be read.
    Token,
}

/// Result of re-reading a user's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSync {
    /// The store answered with the user's current role.
    Current {
        role: Role,
        organization_id: Option<DbId>,
    },
    /// The user no longer exists or has been deactivated.
    Revoked,
    /// The store could not be read.
    Unavailable,
}

/// Parse a stored role name, falling back to the default role.
pub fn parse_stored_role(user_id: DbId, stored: &str) -> Role {
    stored.parse().unwrap_or_else(|_| {
        tracing::warn!(user_id, role = stored, "Unknown stored role, using default");
        DEFAULT_ROLE
    })
}

/// Interpret the outcome of a role lookup for a request.
pub fn interpret_role_lookup(
    user_id: DbId,
    lookup: Result<Option<RoleRecord>, sqlx::Error>,
) -> RoleSync {
    match lookup {
        Ok(Some(record)) if record.is_active => RoleSync::Current {
            role: parse_stored_role(user_id, &record.role),
            organization_id: record.organization_id,
        },
        Ok(_) => RoleSync::Revoked,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Role lookup failed, keeping token role");
            RoleSync::Unavailable
        }
    }
}

/// Re-read the current role of `user_id` from the store.
pub async fn sync_role(pool: &DbPool, user_id: DbId) -> RoleSync {
    interpret_role_lookup(user_id, UserRepo::find_role(pool, user_id).await)
}

/// Resolve the role to bake into a fresh token at sign-in or refresh.
///
/// Uses the stored role when the lookup succeeds and the default role
/// otherwise, so signing in never fails because of the role lookup.
pub fn resolve_sign_in_role(
    user_id: DbId,
    lookup: Result<Option<RoleRecord>, sqlx::Error>,
) -> Role {
    match lookup {
        Ok(Some(record)) => parse_stored_role(user_id, &record.role),
        Ok(None) => {
            tracing::warn!(user_id, "No role record at sign-in, using default role");
            DEFAULT_ROLE
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Role lookup failed at sign-in, using default role");
            DEFAULT_ROLE
        }
    }
}

/// Promote the configured admin email to `admin` on sign-in.
///
/// Best-effort: errors are logged and the current role is kept. Users who
/// already hold an admin-level role are left alone. Returns `true` if the
/// stored role changed.
pub async fn promote_configured_admin(
    pool: &DbPool,
    config: &ServerConfig,
    user_id: DbId,
    email: &str,
    current: Role,
) -> bool {
    if current.is_admin() || !config.is_admin_email(email) {
        return false;
    }
    match UserRepo::set_role(pool, user_id, ROLE_ADMIN).await {
        Ok(changed) => {
            if changed {
                tracing::info!(user_id, "Promoted configured admin email to admin");
            }
            changed
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to promote configured admin email");
            false
        }
    }
}
