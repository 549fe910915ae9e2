//! Request body extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejections render as 400 `{error, code}` bodies.
///
/// A missing field, a wrong type or malformed JSON is reported as
/// `VALIDATION_ERROR` instead of axum's plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
