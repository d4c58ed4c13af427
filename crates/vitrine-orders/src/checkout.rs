//! # Checkout
//!
//! Starts payment for an order: the storefront gets a client secret, the
//! gateway gets the order total and the order id as correlation metadata.
//!
//! ```text
//!   start_payment(order_id, caller)
//!       │
//!       ├── authorized read            NotFound / Forbidden
//!       ├── status must be pending     InvalidTransition
//!       └── GatewayAdapter::create_intent_minor(total, currency, order_id)
//!                │
//!                ▼
//!           { clientSecret, paymentIntentId }
//! ```
//!
//! Nothing here writes to the order; the status only moves when the
//! payment outcome comes back through reconciliation.

use std::sync::Arc;

use tracing::debug;
use vitrine_core::{IntentRequest, IntentResponse, OrderStatus};

use crate::error::{OrderError, OrderResult};
use crate::gateway::GatewayAdapter;
use crate::lifecycle::OrderLifecycle;

#[derive(Clone)]
pub struct CheckoutService {
    lifecycle: Arc<OrderLifecycle>,
    gateway: GatewayAdapter,
}

impl CheckoutService {
    pub fn new(lifecycle: Arc<OrderLifecycle>, gateway: GatewayAdapter) -> Self {
        CheckoutService { lifecycle, gateway }
    }

    /// Creates a payment intent for the full total of one of the caller's
    /// pending orders.
    pub async fn start_payment(
        &self,
        order_id: &str,
        caller_email: &str,
        currency: Option<&str>,
    ) -> OrderResult<IntentResponse> {
        let order = self.lifecycle.authorized_order(order_id, caller_email).await?;

        if order.status != OrderStatus::Pending {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Processing,
            });
        }

        debug!(order_id = %order.id, total = %order.total(), "Starting payment");

        let currency = self.gateway.resolve_currency(currency)?;
        self.gateway
            .create_intent_minor(order.total(), &currency, Some(&order.id))
            .await
    }

    /// Raw intent creation: `{ amount, currency?, orderId? }`.
    pub async fn create_intent(&self, request: IntentRequest) -> OrderResult<IntentResponse> {
        self.gateway
            .create_intent(request.amount, request.currency.as_deref(), request.order_id.as_deref())
            .await
    }
}
