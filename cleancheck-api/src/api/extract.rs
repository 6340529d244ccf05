//! Request extractors
//!
//! Body rejections are reported as 400s in the API error shape instead of
//! axum's plain-text defaults.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON request body; malformed input becomes [`ApiError::BadRequest`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
