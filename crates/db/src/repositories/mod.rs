//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must share a
//! transaction with other writes take `&mut PgConnection` instead.

pub mod blog_post_repo;
pub mod change_request_repo;
pub mod hour_transaction_repo;
pub mod invoice_repo;
pub mod maintenance_plan_repo;
pub mod notification_repo;
pub mod organization_repo;
pub mod project_repo;
pub mod project_request_repo;
pub mod session_repo;
pub mod task_repo;
pub mod user_repo;

pub use blog_post_repo::BlogPostRepo;
pub use change_request_repo::ChangeRequestRepo;
pub use hour_transaction_repo::HourTransactionRepo;
pub use invoice_repo::InvoiceRepo;
pub use maintenance_plan_repo::{DeductionError, MaintenancePlanRepo};
pub use notification_repo::NotificationRepo;
pub use organization_repo::OrganizationRepo;
pub use project_repo::ProjectRepo;
pub use project_request_repo::ProjectRequestRepo;
pub use session_repo::SessionRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
