//! Extractors whose rejections use the API error envelope.
//!
//! axum's stock `Json`, `Query` and `Path` reject with plain-text bodies and,
//! for JSON data errors, a 422. These wrappers route every rejection through
//! [`AppError::ValidationError`] so malformed input is always a 400 with the
//! usual `{"success": false, "error": ...}` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::utils::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
