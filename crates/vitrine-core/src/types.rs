//! # Domain Types
//!
//! Core domain types used throughout the Vitrine order core.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  order_id (FK)  │       │
//! │  │  name           │   │  code ORD-...   │   │  product_name   │       │
//! │  │  price_cents    │   │  status         │   │  unit_price     │       │
//! │  │  is_active      │   │  total_cents    │   │  quantity       │       │
//! │  └─────────────────┘   │  delivery       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      User       │   │  OrderStatus    │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id (UUID)      │   │  Pending        │                              │
//! │  │  email          │   │  Processing     │                              │
//! │  └─────────────────┘   │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders carry two identities:
//! - `id`: UUID v4, immutable, used for relations and gateway metadata
//! - `code`: `ORD-YYYYMMDD-NNNN`, shown to customers and support staff

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

/// Where an order is in its lifecycle.
///
/// ## State Machine
/// ```text
///                ┌──────────────┐
///          ┌────►│  Processing  │   payment captured
///          │     └──────────────┘
/// ┌─────────┐
/// │ Pending │
/// └─────────┘
///          │     ┌──────────────┐
///          └────►│  Cancelled   │   payment failed
///                └──────────────┘
/// ```
/// Nothing leaves `Processing` back to `Pending`, nothing leaves `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, waiting for payment.
    Pending,
    /// Payment captured, order is being fulfilled.
    Processing,
    /// Payment failed or order abandoned.
    Cancelled,
}

impl OrderStatus {
    /// Returns the lowercase name stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Checks whether `self → next` is an edge of the state machine.
    ///
    /// Self-loops are not edges: `processing → processing` is rejected.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    /// States from which `target` may be entered.
    ///
    /// Used to build the conditional `UPDATE ... WHERE status IN (...)`.
    pub const fn sources_of(target: OrderStatus) -> &'static [OrderStatus] {
        match target {
            OrderStatus::Pending => &[],
            OrderStatus::Processing | OrderStatus::Cancelled => &[OrderStatus::Pending],
        }
    }

    /// Checks a transition, returning the domain error for an illegal one.
    pub fn ensure_transition(self, next: OrderStatus) -> CoreResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { from: self, to: next })
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown order status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A storefront customer. Read-only from the order core's point of view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    /// Login identity; the authenticated caller is passed around as this.
    pub email: String,
    pub display_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. The order core only reads price and availability.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in minor units.
    pub price_cents: i64,
    /// Inactive products cannot be ordered (soft delete).
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Delivery Info
// =============================================================================

/// Delivery contact block captured with the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_name"))]
    pub name: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_email"))]
    pub email: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_phone"))]
    pub phone: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_address"))]
    pub address: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_city"))]
    pub city: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_region"))]
    pub region: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_postal_code"))]
    pub postal_code: Option<String>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_country"))]
    pub country: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "delivery_notes"))]
    pub notes: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order header. Line items live in [`OrderItem`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// `ORD-YYYYMMDD-NNNN`. `None` only on legacy rows awaiting backfill.
    pub code: Option<String>,
    pub status: OrderStatus,
    /// Σ line totals, fixed at creation.
    pub total_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub delivery: DeliveryInfo,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// The single authorization predicate for order reads.
    ///
    /// Every caller-facing read path goes through this; there is no
    /// admin bypass in the core.
    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern: product name and price are frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Position in the submitted cart, starting at 0.
    pub position: i64,
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub product_name: String,
    /// Unit price in minor units at time of order (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Order Creation Input
// =============================================================================

/// One cart line as submitted by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
    /// Price the customer saw, in minor units. Checked against the catalog.
    #[serde(default)]
    pub unit_price_snapshot: Option<i64>,
}

impl NewOrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        NewOrderItem {
            product_id: product_id.into(),
            quantity,
            unit_price_snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, unit_price_cents: i64) -> Self {
        self.unit_price_snapshot = Some(unit_price_cents);
        self
    }
}

/// Cart submission: items plus delivery contact.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<NewOrderItem>,
    pub delivery: DeliveryInfo,
}

// =============================================================================
// Views
// =============================================================================

/// One line of an [`OrderView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        OrderItemView {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            subtotal_cents: item.line_total_cents,
        }
    }
}

/// What callers of the order core see, and what the confirmation
/// notification carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub code: Option<String>,
    pub status: OrderStatus,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub delivery: DeliveryInfo,
    pub items: Vec<OrderItemView>,
}

impl OrderView {
    /// Builds a view from an order header and its items (already in position order).
    pub fn from_parts(order: &Order, items: &[OrderItem]) -> Self {
        OrderView {
            id: order.id.clone(),
            code: order.code.clone(),
            status: order.status,
            total_cents: order.total_cents,
            created_at: order.created_at,
            delivery: order.delivery.clone(),
            items: items.iter().map(OrderItemView::from).collect(),
        }
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_legal_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        use OrderStatus::*;
        for (from, to) in [
            (Processing, Pending),
            (Processing, Cancelled),
            (Processing, Processing),
            (Cancelled, Pending),
            (Cancelled, Processing),
            (Cancelled, Cancelled),
            (Pending, Pending),
        ] {
            assert!(!from.can_transition_to(to), "{} -> {} must be rejected", from, to);
            assert!(matches!(
                from.ensure_transition(to),
                Err(CoreError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_sources_match_edges() {
        for target in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Cancelled] {
            for source in OrderStatus::sources_of(target) {
                assert!(source.can_transition_to(target));
            }
        }
        assert!(OrderStatus::sources_of(OrderStatus::Pending).is_empty());
    }

    #[test]
    fn test_status_string_round_trip() {
        assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
        assert!("PAID".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let now = Utc::now();
        let order = Order {
            id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            code: Some("ORD-20231211-0001".to_string()),
            status: OrderStatus::Pending,
            total_cents: 2500,
            delivery: DeliveryInfo {
                name: "Ana".to_string(),
                postal_code: Some("010101".to_string()),
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        };
        let items = vec![OrderItem {
            id: "i-1".to_string(),
            order_id: "o-1".to_string(),
            position: 0,
            product_id: "p-1".to_string(),
            product_name: "Mug".to_string(),
            unit_price_cents: 1250,
            quantity: 2,
            line_total_cents: 2500,
        }];

        let view = OrderView::from_parts(&order, &items);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["totalCents"], 2500);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["delivery"]["postalCode"], "010101");
        assert_eq!(json["items"][0]["subtotalCents"], 2500);
        assert_eq!(json["items"][0]["productName"], "Mug");
    }

    #[test]
    fn test_ownership_predicate() {
        let now = Utc::now();
        let order = Order {
            id: "o-1".to_string(),
            user_id: "u-1".to_string(),
            code: None,
            status: OrderStatus::Pending,
            total_cents: 0,
            delivery: DeliveryInfo::default(),
            created_at: now,
            updated_at: now,
        };
        assert!(order.is_owned_by("u-1"));
        assert!(!order.is_owned_by("u-2"));
    }

    #[test]
    fn test_new_order_item_snapshot_is_optional() {
        let item: NewOrderItem =
            serde_json::from_str(r#"{"productId":"p-1","quantity":2}"#).unwrap();
        assert_eq!(item.unit_price_snapshot, None);
        assert_eq!(item.quantity, 2);
    }
}
