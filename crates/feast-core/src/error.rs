//! # Error Types
//!
//! Domain-specific error types for feast-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  feast-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── ErrorKind        - Stable classification shared by every layer     │
//! │                                                                         │
//! │  feast-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  feast-api errors (in app)                                              │
//! │  └── ApiError         - What clients see (JSON + HTTP status)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (status, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to exactly one [`ErrorKind`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Stable failure classification.
///
/// Every error in the workspace collapses into one of these. Clients branch on
/// the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Entity absent, or present but owned by someone else.
    NotFound,
    /// Checkout attempted with nothing in the cart.
    EmptyCart,
    /// Uniqueness or concurrent-modification violation.
    Conflict,
    /// Caller is known but not allowed to perform the action.
    Forbidden,
    /// Order status outside the enumeration or not reachable.
    InvalidStatus,
    /// Input failed shape or range validation.
    ValidationFailed,
    /// No valid credentials were presented.
    Unauthenticated,
    /// Unexpected failure; details are logged, never returned.
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations detected before any
/// mutation happens.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was requested for an empty cart.
    ///
    /// ## When This Occurs
    /// - User never added anything
    /// - Cart was cleared (or already checked out) by a concurrent request
    ///
    /// ## User Workflow
    /// ```text
    /// POST /checkout
    ///      │
    ///      ▼
    /// Read cart inside transaction: 0 entries
    ///      │
    ///      ▼
    /// EmptyCart (no order row is written)
    /// ```
    #[error("Cart is empty")]
    EmptyCart,

    /// The status string is not a member of the enumeration.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// Strict policy rejected the transition.
    #[error("Cannot change order status from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An order amount does not fit in an `i64`.
    #[error("Order amount is too large")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::EmptyCart => ErrorKind::EmptyCart,
            CoreError::InvalidStatus(_) | CoreError::IllegalTransition { .. } => {
                ErrorKind::InvalidStatus
            }
            CoreError::QuantityTooLarge { .. }
            | CoreError::AmountOverflow
            | CoreError::Validation(_) => {
                ErrorKind::ValidationFailed
            }
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::IllegalTransition {
            from: "done".to_string(),
            to: "preparing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot change order status from done to preparing"
        );
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "payment_method".to_string(),
        };
        assert_eq!(err.to_string(), "payment_method is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        };
        assert_eq!(err.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(CoreError::EmptyCart.kind(), ErrorKind::EmptyCart);
        assert_eq!(
            CoreError::InvalidStatus("shipped".into()).kind(),
            ErrorKind::InvalidStatus
        );
        assert_eq!(
            CoreError::QuantityTooLarge { requested: 1000, max: 999 }.kind(),
            ErrorKind::ValidationFailed
        );
    }

    #[test]
    fn test_kind_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidStatus).unwrap();
        assert_eq!(json, "\"INVALID_STATUS\"");
    }
}
