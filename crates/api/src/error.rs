use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_core::error::CoreError;
use portal_db::repositories::DeductionError;
use serde::Serialize;

/// Error type returned by every handler.
///
/// Domain failures arrive as [`CoreError`]; the remaining variants cover
/// storage errors and HTTP-only cases. All of them render as [`ErrorBody`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A resource addressed by something other than its id was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged in full, reported to the caller as a generic message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON body of every error response: `{"error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl From<DeductionError> for AppError {
    fn from(err: DeductionError) -> Self {
        match err {
            DeductionError::PlanNotFound(id) => AppError::Core(CoreError::NotFound {
                entity: "MaintenancePlan",
                id,
            }),
            DeductionError::PlanInactive(id) => AppError::Core(CoreError::Conflict(format!(
                "Maintenance plan {id} is not active"
            ))),
            DeductionError::Invalid(core) => AppError::Core(core),
            DeductionError::Database(db) => AppError::Database(db),
        }
    }
}

/// Body extraction failures are the caller's fault: report them as 400.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        let (status, code, error) = match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(err),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };
        (status, ErrorBody { error, code })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn core_parts(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map a sqlx error to a response.
///
/// Unique violations on `uq_*` constraints become 409 and foreign key
/// violations become 400. Anything else is logged and reported as 500.
fn database_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some("23505") if constraint.starts_with("uq_") => {
                return (StatusCode::CONFLICT, "CONFLICT", conflict_message(constraint));
            }
            Some("23503") => {
                return (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REFERENCE",
                    format!("Referenced record does not exist: {constraint}"),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    internal()
}

/// Caller-facing message for a unique constraint violation.
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_users_email" => "A user with this email already exists".to_string(),
        "uq_organizations_slug" => "An organization with this slug already exists".to_string(),
        "uq_blog_posts_slug" => "A blog post with this title already exists".to_string(),
        "uq_maintenance_plans_active_project" => {
            "The project already has an active maintenance plan".to_string()
        }
        "uq_invoices_number" => "Invoice number already issued; retry".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_get_readable_messages() {
        assert_eq!(
            conflict_message("uq_users_email"),
            "A user with this email already exists"
        );
        assert_eq!(
            conflict_message("uq_projects_code"),
            "Duplicate value violates unique constraint: uq_projects_code"
        );
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let (status, body) = AppError::BadRequest("line items are empty".into()).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "BAD_REQUEST");
        assert_eq!(body.error, "line items are empty");
    }
}
