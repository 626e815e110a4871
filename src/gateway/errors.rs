//! # Gateway Errors
//!
//! Error taxonomy for the gateway. Every error path returns the same JSON
//! envelope shape so callers can branch on the `success` flag alone.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::response::Envelope;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway errors
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Malformed path, missing required id, non-object payload, or a bad
    /// control parameter. Never retried, surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    /// Id-scoped read or delete with no matching row
    #[error("record not found")]
    NotFound,

    /// Uniqueness violation on create, with a user-facing message distinct
    /// from the raw engine error
    #[error("{0}")]
    Conflict(String),

    /// HTTP method not recognized for the requested path shape
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Any other engine failure; the raw engine message passes through
    #[error("{0}")]
    Storage(String),
}

impl GatewayError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(Envelope::failure(self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::Conflict("dup".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GatewayError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GatewayError::Storage("disk".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_messages_surface_verbatim() {
        let err = GatewayError::Validation("row id is required".to_string());
        assert_eq!(err.to_string(), "row id is required");

        let err = GatewayError::Storage("disk I/O error".to_string());
        assert_eq!(err.to_string(), "disk I/O error");
    }
}
