pub mod admin;
pub mod auth;
pub mod blog;
pub mod change_request;
pub mod invoice;
pub mod maintenance_plan;
pub mod notification;
pub mod organization;
pub mod project;
pub mod project_request;
pub mod task;
