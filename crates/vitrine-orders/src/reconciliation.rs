//! # Payment Reconciliation
//!
//! Applies asynchronous payment outcomes to order state.
//!
//! ## Signal Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PaymentSignal { paymentIntentId, succeeded | failed }                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  retrieve_intent(id) ─── gateway error ──► Err(PaymentGateway)         │
//! │       │                                    (gateway retries callback)  │
//! │       ▼                                                                 │
//! │  metadata.orderId? ───── none ───────────► Uncorrelated                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  transition(order, processing | cancelled)                             │
//! │       ├── ok ─────────► Applied   (+ confirmation on success)          │
//! │       ├── same state ─► AlreadyApplied   (no second notification)      │
//! │       ├── illegal ────► Inconsistent { current, attempted }            │
//! │       └── no order ───► Err(NotFound)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Outcomes are typed and non-fatal: redelivered signals are answered with
//! `AlreadyApplied`, and a confirmation that fails to send is logged and
//! reported without undoing the transition.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use vitrine_core::{OrderStatus, PaymentOutcome, PaymentSignal};

use crate::error::{OrderError, OrderResult};
use crate::gateway::GatewayAdapter;
use crate::lifecycle::OrderLifecycle;
use crate::notifier::OrderNotifier;

/// What happened to the confirmation notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "reason")]
pub enum NotificationStatus {
    Sent,
    /// Delivery failed; the order keeps its new status.
    Failed(String),
    /// Nothing to confirm (payment failed).
    NotRequired,
}

/// Result of applying one payment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ReconcileOutcome {
    /// The order moved to `status`.
    Applied {
        order_id: String,
        status: OrderStatus,
        notification: NotificationStatus,
    },
    /// The order was already in the target status.
    AlreadyApplied { order_id: String, status: OrderStatus },
    /// The intent carries no order id.
    Uncorrelated { intent_id: String },
    /// The outcome contradicts the order's state (e.g. success after cancel).
    Inconsistent {
        order_id: String,
        current: OrderStatus,
        attempted: OrderStatus,
    },
}

/// Drives the lifecycle from payment outcomes.
#[derive(Clone)]
pub struct ReconciliationService {
    lifecycle: Arc<OrderLifecycle>,
    gateway: GatewayAdapter,
    notifier: Arc<dyn OrderNotifier>,
}

impl ReconciliationService {
    pub fn new(lifecycle: Arc<OrderLifecycle>, gateway: GatewayAdapter, notifier: Arc<dyn OrderNotifier>) -> Self {
        ReconciliationService {
            lifecycle,
            gateway,
            notifier,
        }
    }

    /// Payment captured: `pending → processing`, then confirm.
    pub async fn on_payment_succeeded(&self, intent_id: &str) -> OrderResult<ReconcileOutcome> {
        self.apply(intent_id, OrderStatus::Processing).await
    }

    /// Payment failed: `pending → cancelled`.
    pub async fn on_payment_failed(&self, intent_id: &str) -> OrderResult<ReconcileOutcome> {
        self.apply(intent_id, OrderStatus::Cancelled).await
    }

    /// Dispatches a parsed webhook / poller signal.
    pub async fn on_signal(&self, signal: &PaymentSignal) -> OrderResult<ReconcileOutcome> {
        match signal.outcome {
            PaymentOutcome::Succeeded => self.on_payment_succeeded(&signal.payment_intent_id).await,
            PaymentOutcome::Failed => self.on_payment_failed(&signal.payment_intent_id).await,
        }
    }

    async fn apply(&self, intent_id: &str, target: OrderStatus) -> OrderResult<ReconcileOutcome> {
        let intent = self.gateway.retrieve_intent(intent_id).await.map_err(|e| {
            error!(intent_id = %intent_id, error = %e, "Could not retrieve payment intent");
            e
        })?;

        let Some(order_id) = intent.order_id() else {
            warn!(intent_id = %intent_id, "Payment intent has no order id, nothing to reconcile");
            return Ok(ReconcileOutcome::Uncorrelated {
                intent_id: intent_id.to_string(),
            });
        };
        let order_id = order_id.to_string();

        match self.lifecycle.transition(&order_id, target).await {
            Ok(order) => {
                let notification = if target == OrderStatus::Processing {
                    match self.notifier.send_confirmation(&order).await {
                        Ok(()) => NotificationStatus::Sent,
                        Err(e) => {
                            warn!(order_id = %order_id, error = %e, "Confirmation not sent, order stays processing");
                            NotificationStatus::Failed(e.to_string())
                        }
                    }
                } else {
                    NotificationStatus::NotRequired
                };

                info!(order_id = %order_id, intent_id = %intent_id, status = %target, "Payment outcome applied");
                Ok(ReconcileOutcome::Applied {
                    order_id,
                    status: target,
                    notification,
                })
            }
            Err(OrderError::InvalidTransition { from, to }) if from == to => {
                info!(order_id = %order_id, status = %to, "Payment outcome already applied");
                Ok(ReconcileOutcome::AlreadyApplied { order_id, status: to })
            }
            Err(OrderError::InvalidTransition { from, to }) => {
                warn!(
                    order_id = %order_id,
                    intent_id = %intent_id,
                    current = %from,
                    attempted = %to,
                    "Payment outcome contradicts order state"
                );
                Ok(ReconcileOutcome::Inconsistent {
                    order_id,
                    current: from,
                    attempted: to,
                })
            }
            Err(e) => {
                error!(order_id = %order_id, intent_id = %intent_id, error = %e, "Reconciliation failed");
                Err(e)
            }
        }
    }
}
