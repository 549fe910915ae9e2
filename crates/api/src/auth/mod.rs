//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//! - [`session`] -- Role synchronization between token claims and the user store.

pub mod jwt;
pub mod password;
pub mod session;
