//! # Validation Module
//!
//! Input validation for order submissions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Immediate feedback on the checkout form                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Order core (Rust)                                            │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: shape of items and delivery block                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Lifecycle manager                                            │
//! │  └── Catalog lookups, price snapshot check                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── CHECK (quantity > 0)                                              │
//! │  ├── UNIQUE (code)                                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::validation::{validate_quantity, validate_email};
//!
//! validate_quantity(5).unwrap();
//! validate_email("delivery_email", "ana@example.ro").unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{CreateOrderRequest, DeliveryInfo, NewOrderItem};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for free-text delivery fields.
const MAX_FIELD_LEN: usize = 200;

/// Upper bound for delivery notes.
const MAX_NOTES_LEN: usize = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional text field: absent is fine, present must fit.
pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an email address.
///
/// Deliberately loose: one `@`, something on both sides, a dot in the
/// domain. Deliverability is the notification collaborator's problem.
///
/// ```rust
/// use vitrine_core::validation::validate_email;
///
/// assert!(validate_email("email", "ana@example.ro").is_ok());
/// assert!(validate_email("email", "ana@localhost").is_err());
/// assert!(validate_email("email", "").is_err());
/// ```
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    validate_required(field, email, MAX_FIELD_LEN)?;

    let email = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be an email address".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.contains(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
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

/// Validates a price in minor units. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates the cart lines of a submission.
///
/// ## Rules
/// - At least one line, at most MAX_ORDER_ITEMS (100)
/// - Every quantity passes [`validate_quantity`]
/// - A submitted price snapshot, if any, is not negative
pub fn validate_items(items: &[NewOrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in items {
        validate_required("productId", &item.product_id, MAX_FIELD_LEN)?;
        validate_quantity(item.quantity)?;
        if let Some(snapshot) = item.unit_price_snapshot {
            validate_price_cents(snapshot)?;
        }
    }

    Ok(())
}

/// Validates the delivery contact block.
///
/// Name, email, phone, address, city and country are mandatory; region,
/// postal code and notes are optional.
pub fn validate_delivery(delivery: &DeliveryInfo) -> ValidationResult<()> {
    validate_required("delivery name", &delivery.name, MAX_FIELD_LEN)?;
    validate_email("delivery email", &delivery.email)?;
    validate_required("delivery phone", &delivery.phone, 40)?;
    validate_required("delivery address", &delivery.address, MAX_FIELD_LEN)?;
    validate_required("delivery city", &delivery.city, MAX_FIELD_LEN)?;
    validate_required("delivery country", &delivery.country, MAX_FIELD_LEN)?;
    validate_optional("delivery region", delivery.region.as_deref(), MAX_FIELD_LEN)?;
    validate_optional("delivery postal code", delivery.postal_code.as_deref(), 20)?;
    validate_optional("delivery notes", delivery.notes.as_deref(), MAX_NOTES_LEN)?;
    Ok(())
}

/// Validates a whole cart submission before anything touches the database.
pub fn validate_order_request(request: &CreateOrderRequest) -> ValidationResult<()> {
    validate_items(&request.items)?;
    validate_delivery(&request.delivery)
}

// =============================================================================
// Unit Tests
// =============================================================================
