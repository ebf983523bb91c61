//! Error types for the API.
//!
//! ## Error Flow
//! ```text
//! ValidationError ──► CoreError ──► DbError ──► ApiError ──► HTTP response
//!                                                  │
//!                                                  └── { "code": "NOT_FOUND",
//!                                                        "message": "..." }
//! ```
//!
//! Internal failures are logged here and answered with a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use feast_core::{CoreError, ErrorKind, ValidationError};
use feast_db::DbError;

/// Stable error code returned to clients.
pub type ErrorCode = ErrorKind;

/// An error that becomes an HTTP response.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

/// Convenience alias for handler and service results.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Logs the cause and hides it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "Internal error");
        Self::new(ErrorKind::Internal, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::EmptyCart => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::InvalidStatus => StatusCode::BAD_REQUEST,
            ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        match error.kind() {
            ErrorKind::Internal => ApiError::internal(&error),
            ErrorKind::NotFound => match error {
                // Constraint text names tables; keep it out of responses
                DbError::ForeignKeyViolation { .. } => ApiError::not_found("Referenced entity not found"),
                other => ApiError::not_found(other.to_string()),
            },
            ErrorKind::Conflict => match error {
                DbError::UniqueViolation { field } => {
                    ApiError::conflict(format!("{} already exists", field))
                }
                other => ApiError::conflict(other.to_string()),
            },
            kind => match error {
                DbError::Rule(core) => core.into(),
                other => ApiError::new(kind, other.to_string()),
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let message = match &error {
            CoreError::Validation(inner) => inner.to_string(),
            other => other.to_string(),
        };
        ApiError::new(error.kind(), message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::new(ErrorKind::ValidationFailed, error.to_string())
    }
}

// =============================================================================
// Extractor Rejections
// =============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorKind::ValidationFailed, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            // Route/handler mismatch, not client input
            PathRejection::MissingPathParams(inner) => ApiError::internal(inner.body_text()),
            other => ApiError::new(ErrorKind::ValidationFailed, other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorKind::ValidationFailed, rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorKind::NotFound, 404),
            (ErrorKind::EmptyCart, 400),
            (ErrorKind::Conflict, 409),
            (ErrorKind::Forbidden, 403),
            (ErrorKind::InvalidStatus, 400),
            (ErrorKind::ValidationFailed, 422),
            (ErrorKind::Unauthenticated, 401),
            (ErrorKind::Internal, 500),
        ];

        for (kind, status) in cases {
            assert_eq!(ApiError::new(kind, "x").status().as_u16(), status);
        }
    }

    #[test]
    fn test_db_errors() {
        let err: ApiError = DbError::not_found("Order", 7).into();
        assert_eq!(err.code, ErrorKind::NotFound);

        let err: ApiError = DbError::duplicate("email").into();
        assert_eq!(err.code, ErrorKind::Conflict);
        assert_eq!(err.message, "email already exists");

        let err: ApiError = DbError::Rule(CoreError::EmptyCart).into();
        assert_eq!(err.code, ErrorKind::EmptyCart);
    }

    #[test]
    fn test_internal_hides_cause() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".to_string()).into();
        assert_eq!(err.code, ErrorKind::Internal);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::new(ErrorKind::EmptyCart, "Cart is empty")).unwrap();
        assert_eq!(json["code"], "EMPTY_CART");
        assert_eq!(json["message"], "Cart is empty");
    }
}
