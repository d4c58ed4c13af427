//! # vitrine-core: Pure Domain Logic for the Vitrine Order Core
//!
//! This crate holds everything about orders and payments that can be
//! decided without touching a database, a network or a clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vitrine Order Core                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            HTTP surface / webhooks (outside this repo)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   vitrine-orders: lifecycle, checkout, gateway, reconciliation  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vitrine-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │   money   │  │ order_code │  │ validation│ │   │
//! │  │   │  Order    │  │   Money   │  │ ORD-date-  │  │   rules   │ │   │
//! │  │   │  Status   │  │  minor    │  │  sequence  │  │  checks   │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                  ┌───────────┐                                 │   │
//! │  │                  │  payment  │  Currency, intents, signals     │   │
//! │  │                  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              vitrine-db (SQLite repositories)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Orders, line items, products, users, views
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order_code`] - `ORD-YYYYMMDD-NNNN` references
//! - [`payment`] - Currency, payment intents and outcome signals
//! - [`error`] - Domain error types
//! - [`validation`] - Order input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use vitrine_core::money::Money;
//! use vitrine_core::OrderStatus;
//!
//! let line = Money::from_cents(1000).multiply_quantity(2).unwrap();
//! assert_eq!(line.cents(), 2000);
//!
//! assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
//! assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Processing));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order_code;
pub mod payment;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order_code::OrderCode;
pub use payment::{Currency, IntentRequest, IntentResponse, PaymentIntent, PaymentOutcome, PaymentSignal};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines in a single order.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity on a single order line.
///
/// Guards against typos like 1000 instead of 10 reaching the gateway.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Currency used when an intent request does not name one (Romanian leu).
pub const DEFAULT_CURRENCY: &str = "ron";

/// Gateway metadata key carrying the originating order id.
pub const ORDER_ID_METADATA_KEY: &str = "orderId";
