//! # Confirmation Notifier
//!
//! The core does not deliver e-mail. When a payment is confirmed it hands
//! the full order view to an [`OrderNotifier`] and moves on.
//!
//! ```text
//!   Reconciliation ──► OrderNotifier::send_confirmation(&OrderView)
//!                          ├── LogNotifier      structured log line
//!                          └── ChannelNotifier  ConfirmationEvent ──► mpsc ──► delivery worker
//! ```
//!
//! A failed notification never rolls an order back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;
use vitrine_core::OrderView;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification queue is full")]
    QueueFull,

    #[error("Notification queue is closed")]
    QueueClosed,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Something that tells the customer their order is confirmed.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send_confirmation(&self, order: &OrderView) -> Result<(), NotifyError>;
}

/// "Send a confirmation for this order", as queued for a delivery worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationEvent {
    /// Delivery e-mail from the order.
    pub recipient: String,
    pub order: OrderView,
    pub emitted_at: DateTime<Utc>,
}

impl ConfirmationEvent {
    pub fn for_order(order: &OrderView) -> Self {
        ConfirmationEvent {
            recipient: order.delivery.email.clone(),
            order: order.clone(),
            emitted_at: Utc::now(),
        }
    }
}

/// Logs the confirmation and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn send_confirmation(&self, order: &OrderView) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id,
            code = ?order.code,
            recipient = %order.delivery.email,
            total = %order.total(),
            "Order confirmation"
        );
        Ok(())
    }
}

/// Queues a [`ConfirmationEvent`] on a bounded channel.
///
/// Never waits: a full queue is reported as [`NotifyError::QueueFull`] so a
/// slow delivery worker cannot stall payment reconciliation.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<ConfirmationEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<ConfirmationEvent>) -> Self {
        ChannelNotifier { tx }
    }

    /// Creates a notifier and the receiving end for the delivery worker.
    ///
    /// A `capacity` of 0 is treated as 1.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ConfirmationEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (ChannelNotifier { tx }, rx)
    }
}

#[async_trait]
impl OrderNotifier for ChannelNotifier {
    async fn send_confirmation(&self, order: &OrderView) -> Result<(), NotifyError> {
        self.tx
            .try_send(ConfirmationEvent::for_order(order))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => NotifyError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => NotifyError::QueueClosed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::{DeliveryInfo, OrderStatus};

    fn view(id: &str) -> OrderView {
        OrderView {
            id: id.to_string(),
            code: Some("ORD-20231211-0001".to_string()),
            status: OrderStatus::Processing,
            total_cents: 2500,
            created_at: Utc::now(),
            delivery: DeliveryInfo {
                name: "Ana Pop".to_string(),
                email: "ana@example.ro".to_string(),
                ..Default::default()
            },
            items: vec![],
        }
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send_confirmation(&view("o-1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers_event() {
        let (notifier, mut rx) = ChannelNotifier::channel(4);
        notifier.send_confirmation(&view("o-1")).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.recipient, "ana@example.ro");
        assert_eq!(event.order.id, "o-1");
    }

    #[tokio::test]
    async fn test_channel_notifier_reports_full_and_closed() {
        let (notifier, rx) = ChannelNotifier::channel(1);
        notifier.send_confirmation(&view("o-1")).await.unwrap();
        assert!(matches!(
            notifier.send_confirmation(&view("o-2")).await,
            Err(NotifyError::QueueFull)
        ));

        drop(rx);
        assert!(matches!(
            notifier.send_confirmation(&view("o-3")).await,
            Err(NotifyError::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one_event() {
        let (notifier, mut rx) = ChannelNotifier::channel(0);
        notifier.send_confirmation(&view("o-1")).await.unwrap();
        assert!(matches!(
            notifier.send_confirmation(&view("o-2")).await,
            Err(NotifyError::QueueFull)
        ));
        assert_eq!(rx.recv().await.unwrap().order.id, "o-1");
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let json = serde_json::to_string(&ConfirmationEvent::for_order(&view("o-1"))).unwrap();
        assert!(json.contains("\"emittedAt\""));
        assert!(json.contains("\"totalCents\":2500"));
    }
}
