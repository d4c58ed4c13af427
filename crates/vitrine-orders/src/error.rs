//! # Order Service Error Types
//!
//! The single error taxonomy callers of the order core see.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Caller      │  │   State         │  │     Infrastructure      │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  NotFound       │  │  InvalidTrans.  │  │  PaymentGateway         │ │
//! │  │  Forbidden      │  │  ConflictRetry. │  │  Database               │ │
//! │  │  Validation     │  │  CodeSpaceExh.  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → OrderError → Caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;
use vitrine_core::{CoreError, OrderStatus, ValidationError};
use vitrine_db::DbError;

/// Result type alias for order service operations.
pub type OrderResult<T> = Result<T, OrderError>;

/// Errors surfaced by the lifecycle, checkout and reconciliation services.
#[derive(Debug, Error)]
pub enum OrderError {
    // =========================================================================
    // Caller Errors
    // =========================================================================
    /// Order, product or user does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The caller does not own the order.
    #[error("Order {order_id} does not belong to the caller")]
    Forbidden { order_id: String },

    /// Input rejected before anything was persisted.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // State Errors
    // =========================================================================
    /// Status change that is not an edge of the state machine.
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Every code drawn for a new order collided with an existing one.
    #[error("Could not allocate a unique order code after {attempts} attempts")]
    ConflictRetryable { attempts: u32 },

    /// More than 9999 orders on one day.
    #[error("Order code space exhausted for {date}")]
    CodeSpaceExhausted { date: NaiveDate },

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    /// Gateway call failed, timed out, or was given an unusable amount.
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    /// Store failure that is none of the above.
    #[error("Database error: {0}")]
    Database(DbError),
}

impl OrderError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        OrderError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        OrderError::PaymentGateway(message.into())
    }

    /// Returns true if repeating the same call may succeed.
    ///
    /// ## Retryable Errors
    /// - Code allocation conflicts
    /// - Gateway failures and timeouts
    /// - Pool exhaustion / connection loss
    pub fn is_retryable(&self) -> bool {
        match self {
            OrderError::ConflictRetryable { .. } | OrderError::PaymentGateway(_) => true,
            OrderError::Database(e) => matches!(e, DbError::PoolExhausted | DbError::ConnectionFailed(_)),
            _ => false,
        }
    }

    /// Returns true if the caller sent something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OrderError::NotFound { .. } | OrderError::Forbidden { .. } | OrderError::Validation(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<DbError> for OrderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => OrderError::NotFound { entity, id },
            other => OrderError::Database(other),
        }
    }
}

impl From<CoreError> for OrderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTransition { from, to } => OrderError::InvalidTransition { from, to },
            CoreError::CodeSpaceExhausted { date } => OrderError::CodeSpaceExhausted { date },
            CoreError::Validation(v) => OrderError::Validation(v),
            CoreError::InvalidAmount { reason } => OrderError::PaymentGateway(reason),
            CoreError::InvalidCurrency(code) => {
                OrderError::PaymentGateway(format!("Unsupported currency: '{}'", code))
            }
            CoreError::InvalidOrderCode { code, .. } => OrderError::NotFound {
                entity: "Order".to_string(),
                id: code,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(OrderError::ConflictRetryable { attempts: 3 }.is_retryable());
        assert!(OrderError::gateway("timed out").is_retryable());
        assert!(OrderError::Database(DbError::PoolExhausted).is_retryable());

        assert!(!OrderError::not_found("Order", "x").is_retryable());
        assert!(!OrderError::Forbidden { order_id: "x".into() }.is_retryable());
        assert!(!OrderError::Database(DbError::QueryFailed("syntax".into())).is_retryable());
    }

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: OrderError = DbError::not_found("Product", "p-1").into();
        assert!(matches!(err, OrderError::NotFound { ref entity, ref id } if entity == "Product" && id == "p-1"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_core_errors_map_to_taxonomy() {
        let err: OrderError = CoreError::InvalidTransition {
            from: OrderStatus::Processing,
            to: OrderStatus::Cancelled,
        }
        .into();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Processing,
                to: OrderStatus::Cancelled
            }
        ));

        let err: OrderError = CoreError::InvalidCurrency("lei!".into()).into();
        assert!(matches!(err, OrderError::PaymentGateway(_)));

        let err: OrderError = CoreError::InvalidOrderCode {
            code: "ORD-x".into(),
            reason: "bad".into(),
        }
        .into();
        assert!(matches!(err, OrderError::NotFound { .. }));
    }
}
