//! Error types for cleancheck-api
//!
//! Every handler returns [`ApiResult`]; service and store errors convert via
//! `From` so handlers can use `?` throughout.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{AccessDenied, PipelineError};
use crate::store::{InspectionError, UserError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request fields (400)
    #[error("{0}")]
    BadRequest(String),

    /// No bearer token on the request (401)
    #[error("Authentication required")]
    Unauthenticated,

    /// Token unknown, revoked, or owner deleted (401)
    #[error("Invalid or expired session")]
    SessionInvalid,

    /// Login mismatch (401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Role insufficient or not owner (403)
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// User directory rule violation
    #[error(transparent)]
    User(#[from] UserError),

    /// Inspection store rule violation
    #[error(transparent)]
    Inspection(#[from] InspectionError),

    /// Analysis pipeline failure
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Unexpected failure (500); detail is logged, not returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::SessionInvalid => (StatusCode::UNAUTHORIZED, "SESSION_INVALID"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::User(err) => match err {
                UserError::MissingFields => (StatusCode::BAD_REQUEST, "MISSING_FIELDS"),
                UserError::UsernameExists(_) => (StatusCode::BAD_REQUEST, "USERNAME_EXISTS"),
                UserError::InvalidRole(_) => (StatusCode::BAD_REQUEST, "INVALID_ROLE"),
                UserError::StaffLimitReached => (StatusCode::BAD_REQUEST, "STAFF_LIMIT_REACHED"),
                UserError::ProtectedAccount(_) => (StatusCode::BAD_REQUEST, "PROTECTED_ACCOUNT"),
                UserError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            },
            ApiError::Inspection(err) => match err {
                InspectionError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                InspectionError::InvalidScore(_) => (StatusCode::BAD_REQUEST, "INVALID_SCORE"),
                InspectionError::InvalidSummary => (StatusCode::BAD_REQUEST, "INVALID_SUMMARY"),
            },
            ApiError::Pipeline(err) => match err {
                PipelineError::MissingImage => (StatusCode::BAD_REQUEST, "MISSING_IMAGE"),
                PipelineError::ExternalCallFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "EXTERNAL_CALL_FAILED")
                }
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(format!("Invalid upload: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::VisionError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApiError::SessionInvalid, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden(AccessDenied::NotOwner), StatusCode::FORBIDDEN),
            (ApiError::User(UserError::StaffLimitReached), StatusCode::BAD_REQUEST),
            (
                ApiError::User(UserError::UserNotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Inspection(InspectionError::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Pipeline(PipelineError::MissingImage),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Pipeline(PipelineError::ExternalCallFailed(VisionError::NotConfigured)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let response = ApiError::Internal("lock poisoned at store.rs:42".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_external_failure_message_is_propagated() {
        let error = ApiError::from(PipelineError::ExternalCallFailed(VisionError::Network(
            "connection refused".into(),
        )));
        let body = axum::body::to_bytes(error.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"]["code"], "EXTERNAL_CALL_FAILED");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }
}
