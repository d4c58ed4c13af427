//! # vitrine-orders: Order Lifecycle & Payment Orchestration
//!
//! Turns a submitted cart into a durable order with a human-readable code,
//! starts payment for it at an external gateway, and reconciles the
//! gateway's asynchronous outcome back onto the order.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Core Service Layer                           │
//! │                                                                         │
//! │   storefront / HTTP layer (outside this workspace)                     │
//! │       │ create_order        │ start_payment       │ webhook body       │
//! │       ▼                     ▼                     ▼                    │
//! │  ┌──────────────┐   ┌────────────────┐   ┌──────────────────────┐     │
//! │  │OrderLifecycle│◄──│CheckoutService │   │ webhook::verify +    │     │
//! │  │              │   └───────┬────────┘   │ parse_webhook_event  │     │
//! │  │ create       │           │            └──────────┬───────────┘     │
//! │  │ get / list   │           ▼                       ▼                 │
//! │  │ transition   │   ┌────────────────┐   ┌──────────────────────┐     │
//! │  │              │   │ GatewayAdapter │◄──│ReconciliationService │     │
//! │  │              │◄──┼────────────────┼───│                      │     │
//! │  └──────┬───────┘   │ StripeGateway  │   └──────────┬───────────┘     │
//! │         │           └────────────────┘              ▼                 │
//! │         ▼                                    OrderNotifier            │
//! │   vitrine-db (SQLite)                        (log / mpsc queue)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML + environment configuration
//! - [`error`] - `OrderError` taxonomy
//! - [`clock`] - Injectable time source
//! - [`lifecycle`] - Order creation, authorized reads, state machine
//! - [`gateway`] - Payment gateway adapter, Stripe client, webhooks
//! - [`checkout`] - Payment intent creation for orders
//! - [`reconciliation`] - Payment outcome → order status
//! - [`notifier`] - Confirmation notification seam
//!
//! ## Usage
//! ```rust,ignore
//! let config = VitrineConfig::load(None)?;
//! let db = Database::new(config.to_db_config()).await?;
//!
//! let lifecycle = Arc::new(OrderLifecycle::from_config(db, &config));
//! let stripe = Arc::new(StripeGateway::from_settings(&config.gateway)?);
//! let gateway = GatewayAdapter::from_settings(stripe, &config.gateway)?;
//!
//! let view = lifecycle.create_order("ana@example.ro", request).await?;
//! let intent = CheckoutService::new(lifecycle.clone(), gateway.clone())
//!     .start_payment(&view.id, "ana@example.ro", None)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod notifier;
pub mod reconciliation;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::CheckoutService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, VitrineConfig};
pub use error::{OrderError, OrderResult};
pub use gateway::webhook::{parse_webhook_event, verify_webhook_signature, WebhookError};
pub use gateway::{GatewayAdapter, GatewayError, PaymentGateway, StripeGateway};
pub use lifecycle::OrderLifecycle;
pub use notifier::{ChannelNotifier, ConfirmationEvent, LogNotifier, NotifyError, OrderNotifier};
pub use reconciliation::{NotificationStatus, ReconcileOutcome, ReconciliationService};
