//! # Validation Module
//!
//! Input validation utilities for Feastline.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors                                               │
//! │  └── Type validation (JSON / query deserialization)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services                                                      │
//! │  └── THIS MODULE: lengths, ranges, formats                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints (email, order code, one review per pair)        │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check runs before any write, so a rejected request never leaves a
//! partial change behind.
//!
//! ## Usage
//! ```rust
//! use feast_core::validation::{validate_quantity, validate_star};
//!
//! validate_quantity(5).unwrap();
//! validate_star(4).unwrap();
//! assert!(validate_star(6).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_STAR, MIN_STAR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest payment method label.
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;
/// Longest order note.
pub const MAX_NOTES_LEN: usize = 500;
/// Longest delivery address.
pub const MAX_ADDRESS_LEN: usize = 255;
/// Longest review comment.
pub const MAX_COMMENT_LEN: usize = 1000;
/// Longest display name.
pub const MAX_NAME_LEN: usize = 100;
/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Longest search string.
pub const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a payment method label.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
///
/// ## Returns
/// The trimmed label.
///
/// ## Example
/// ```rust
/// use feast_core::validation::validate_payment_method;
///
/// assert_eq!(validate_payment_method("  gopay ").unwrap(), "gopay");
/// assert!(validate_payment_method("").is_err());
/// ```
pub fn validate_payment_method(label: &str) -> ValidationResult<String> {
    let label = label.trim();

    if label.is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    check_max_len("payment_method", label, MAX_PAYMENT_METHOD_LEN)?;

    Ok(label.to_string())
}

/// Validates an optional free-text field (notes, address, comment).
///
/// ## Returns
/// `None` for a missing or blank value, otherwise the trimmed text.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            check_max_len(field, text, max)?;
            Ok(Some(text.to_string()))
        }
    }
}

/// Validates a display name.
///
/// ## Rules
/// - 1 to 100 characters after trimming
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    check_max_len("name", name, MAX_NAME_LEN)?;

    Ok(name.to_string())
}

/// Validates an email address and normalizes it to lowercase.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part and domain
/// - No whitespace
///
/// ## Example
/// ```rust
/// use feast_core::validation::validate_email;
///
/// assert_eq!(validate_email(" Ayu@Example.com ").unwrap(), "ayu@example.com");
/// assert!(validate_email("ayu@@example.com").is_err());
/// assert!(validate_email("@example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_lowercase())
        }
        _ => Err(invalid("must look like name@domain")),
    }
}

/// Validates a new password.
///
/// ## Rules
/// - At least 8 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filter)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query, or `None` when blank.
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    validate_optional_text("search", query, MAX_SEARCH_LEN)
}

fn check_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity passed to a cart call.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /cart/items { menu_id: 5, quantity: 2 }                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2) ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"                │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"      │
/// │       │                                                                 │
/// │       └── OK → Upsert cart entry                                        │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a review star (1..=5).
pub fn validate_star(star: i64) -> ValidationResult<()> {
    if !(MIN_STAR..=MAX_STAR).contains(&star) {
        return Err(ValidationError::OutOfRange {
            field: "star".to_string(),
            min: MIN_STAR,
            max: MAX_STAR,
        });
    }

    Ok(())
}

/// Validates a `min_rating` filter (0.0..=5.0).
pub fn validate_min_rating(value: f64) -> ValidationResult<()> {
    if !value.is_finite() || !(0.0..=MAX_STAR as f64).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "min_rating".to_string(),
            min: 0,
            max: MAX_STAR,
        });
    }

    Ok(())
}

/// Validates a configured fee.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free delivery)
pub fn validate_fee(field: &str, minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an entity id taken from a path or body.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_payment_method() {
        assert_eq!(validate_payment_method("cash").unwrap(), "cash");
        assert!(validate_payment_method("").is_err());
        assert!(validate_payment_method("   ").is_err());
        assert!(validate_payment_method(&"x".repeat(50)).is_ok());
        assert!(validate_payment_method(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert_eq!(validate_optional_text("notes", None, 10).unwrap(), None);
        assert_eq!(validate_optional_text("notes", Some("  "), 10).unwrap(), None);
        assert_eq!(
            validate_optional_text("notes", Some(" no chili "), 10).unwrap(),
            Some("no chili".to_string())
        );
        assert!(validate_optional_text("notes", Some("01234567890"), 10).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // 50 multi-byte characters are still 50 characters
        assert!(validate_payment_method(&"é".repeat(50)).is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(" Ayu ").unwrap(), "Ayu");
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@c").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_star() {
        for star in 1..=5 {
            assert!(validate_star(star).is_ok());
        }
        assert!(validate_star(0).is_err());
        assert!(validate_star(6).is_err());
    }

    #[test]
    fn test_validate_min_rating() {
        assert!(validate_min_rating(0.0).is_ok());
        assert!(validate_min_rating(4.5).is_ok());
        assert!(validate_min_rating(5.1).is_err());
        assert!(validate_min_rating(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_fee_and_id() {
        assert!(validate_fee("service_fee", 0).is_ok());
        assert!(validate_fee("service_fee", -1).is_err());
        assert!(validate_id("menu_id", 1).is_ok());
        assert!(validate_id("menu_id", 0).is_err());
    }
}
