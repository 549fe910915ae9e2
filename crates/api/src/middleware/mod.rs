//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer
//!   token and syncs its role from the user store.
//! - [`rbac::RequireAdmin`] -- Requires a role that may manage users.

pub mod auth;
pub mod rbac;
