//! Domain rules for the client portal.
//!
//! Everything in this crate is pure: no I/O, no database access. The `db`
//! and `api` crates call into these modules to validate input and to compute
//! billing outcomes before anything is written.

pub mod error;
pub mod hours;
pub mod invoice;
pub mod pagination;
pub mod policy;
pub mod roles;
pub mod slug;
pub mod types;
pub mod workflow;
