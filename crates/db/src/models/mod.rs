//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod blog_post;
pub mod change_request;
pub mod invoice;
pub mod maintenance_plan;
pub mod notification;
pub mod organization;
pub mod project;
pub mod project_request;
pub mod session;
pub mod task;
pub mod user;
