//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core errors (this file)                                       │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vitrine-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vitrine-orders errors (separate crate)                                │
//! │  └── OrderError       - What callers of the order core see             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → OrderError → Caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A status change that is not an edge of the order state machine.
    ///
    /// ## When This Occurs
    /// - `processing → pending` (no way back)
    /// - anything out of `cancelled`
    /// - repeating a transition (`processing → processing`)
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The 4-digit sequence field for a day is used up.
    ///
    /// More than 9999 orders on one calendar day. The code format cannot
    /// represent the next order, so creation fails instead of wrapping.
    #[error("Order code space exhausted for {date}: more than 9999 orders")]
    CodeSpaceExhausted { date: NaiveDate },

    /// A string that does not parse as `ORD-YYYYMMDD-NNNN`.
    #[error("Invalid order code '{code}': {reason}")]
    InvalidOrderCode { code: String, reason: String },

    /// Amount cannot be expressed for the payment gateway.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Currency code is not three ASCII letters.
    #[error("Unsupported currency: '{0}'")]
    InvalidCurrency(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The price the customer saw no longer matches the catalog.
    #[error("Price of product {product_id} changed: catalog {catalog_cents}, submitted {submitted_cents}")]
    PriceChanged {
        product_id: String,
        catalog_cents: i64,
        submitted_cents: i64,
    },
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
        let err = CoreError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Processing,
        };
        assert_eq!(err.to_string(), "Order cannot move from cancelled to processing");

        let err = CoreError::CodeSpaceExhausted {
            date: NaiveDate::from_ymd_opt(2023, 12, 11).unwrap(),
        };
        assert!(err.to_string().contains("2023-12-11"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "delivery_name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
