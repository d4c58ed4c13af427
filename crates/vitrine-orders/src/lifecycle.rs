//! # Order Lifecycle Manager
//!
//! Owns the order state machine: creates orders from carts, serves
//! ownership-checked reads, and applies status transitions.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CreateOrderRequest + caller email                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate_order_request            → Validation                     │
//! │  2. resolve caller e-mail → User      → NotFound(User)                 │
//! │  3. resolve every product (active)    → NotFound(Product)              │
//! │     snapshot ≠ catalog price          → Validation(PriceChanged)       │
//! │  4. total = Σ unit price × quantity                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. ┌──────────────── attempt 1..=max_code_attempts ────────────────┐  │
//! │     │ seq  = code_sequences.next(YYYYMMDD)   atomic upsert          │  │
//! │     │ code = ORD-YYYYMMDD-{seq:04}           > 9999 → Exhausted     │  │
//! │     │ save(order, items)                     one transaction        │  │
//! │     │   UNIQUE(code) violation ──► sync counter, draw again         │  │
//! │     └───────────────────────────────────────────────────────────────┘  │
//! │       │ all attempts collided → ConflictRetryable                      │
//! │       ▼                                                                 │
//! │  OrderView (status pending)                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machine
//! ```text
//!   pending ──► processing
//!      │
//!      └──────► cancelled
//! ```
//! Transitions are conditional updates in the store, so two racing
//! transitions on one order cannot both win.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use vitrine_core::validation::validate_order_request;
use vitrine_core::{
    CreateOrderRequest, Money, Order, OrderCode, OrderItem, OrderStatus, OrderView, User, ValidationError,
};
use vitrine_db::backfill::sync_code_counter;
use vitrine_db::Database;

use crate::clock::{Clock, SystemClock};
use crate::config::VitrineConfig;
use crate::error::{OrderError, OrderResult};

/// Default bound on code draws per order.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 3;

/// Creates orders, reads them on behalf of their owners, moves them
/// through the state machine.
#[derive(Clone)]
pub struct OrderLifecycle {
    db: Database,
    clock: Arc<dyn Clock>,
    max_code_attempts: u32,
}

impl OrderLifecycle {
    pub fn new(db: Database) -> Self {
        OrderLifecycle {
            db,
            clock: Arc::new(SystemClock),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }

    pub fn from_config(db: Database, config: &VitrineConfig) -> Self {
        Self::new(db).with_max_code_attempts(config.orders.max_code_attempts)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = attempts.max(1);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Turns a cart into a persisted `pending` order.
    pub async fn create_order(&self, caller_email: &str, request: CreateOrderRequest) -> OrderResult<OrderView> {
        validate_order_request(&request)?;

        let owner = self
            .resolve_caller(caller_email)
            .await?
            .ok_or_else(|| OrderError::not_found("User", caller_email))?;

        let now = self.clock.now();
        let order_id = Uuid::new_v4().to_string();

        let mut items = Vec::with_capacity(request.items.len());
        let mut total = Money::zero();
        for (position, line) in request.items.iter().enumerate() {
            let product = self
                .db
                .products()
                .get_orderable(&line.product_id)
                .await?
                .ok_or_else(|| OrderError::not_found("Product", &line.product_id))?;

            if let Some(submitted) = line.unit_price_snapshot {
                if submitted != product.price_cents {
                    return Err(ValidationError::PriceChanged {
                        product_id: product.id.clone(),
                        catalog_cents: product.price_cents,
                        submitted_cents: submitted,
                    }
                    .into());
                }
            }

            let line_total = product
                .price()
                .multiply_quantity(line.quantity)
                .ok_or_else(|| out_of_range("line total"))?;
            total = total.checked_add(line_total).ok_or_else(|| out_of_range("order total"))?;

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                position: position as i64,
                product_id: product.id,
                product_name: product.name,
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
                line_total_cents: line_total.cents(),
            });
        }

        let mut order = Order {
            id: order_id,
            user_id: owner.id,
            code: None,
            status: OrderStatus::Pending,
            total_cents: total.cents(),
            delivery: request.delivery,
            created_at: now,
            updated_at: now,
        };

        let code = self.persist_with_fresh_code(&mut order, &items).await?;

        info!(
            order_id = %order.id,
            code = %code,
            total = %total,
            items = items.len(),
            "Order created"
        );

        Ok(OrderView::from_parts(&order, &items))
    }

    /// Allocates a code and saves, drawing again when the code is taken.
    async fn persist_with_fresh_code(&self, order: &mut Order, items: &[OrderItem]) -> OrderResult<OrderCode> {
        let date = order.created_at.date_naive();
        let day = OrderCode::day_key(date);
        let sequences = self.db.code_sequences();
        let orders = self.db.orders();

        for attempt in 1..=self.max_code_attempts {
            let seq = sequences.next(&day).await?;
            let code = OrderCode::from_counter(date, seq)?;
            order.code = Some(code.to_string());

            match orders.save(order, items).await {
                Ok(()) => return Ok(code),
                Err(e) if e.is_unique_violation_on("orders.code") => {
                    warn!(order_id = %order.id, code = %code, attempt, "Order code already taken, drawing again");
                    // Codes written outside the counter; skip past all of them at once
                    sync_code_counter(&self.db, date).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(order_id = %order.id, attempts = self.max_code_attempts, "Giving up on order code allocation");
        Err(OrderError::ConflictRetryable {
            attempts: self.max_code_attempts,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Reads an order by id on behalf of `caller_email`.
    pub async fn get_order(&self, order_id: &str, caller_email: &str) -> OrderResult<OrderView> {
        let order = self.authorized_order(order_id, caller_email).await?;
        self.view(&order).await
    }

    /// Reads an order by its `ORD-YYYYMMDD-NNNN` code on behalf of `caller_email`.
    pub async fn get_order_by_code(&self, code: &str, caller_email: &str) -> OrderResult<OrderView> {
        let order = self
            .db
            .orders()
            .find_by_code(code.trim())
            .await?
            .ok_or_else(|| OrderError::not_found("Order", code))?;
        self.authorize(&order, caller_email).await?;
        self.view(&order).await
    }

    /// The caller's orders, newest first.
    pub async fn list_orders(&self, caller_email: &str) -> OrderResult<Vec<OrderView>> {
        let owner = self
            .resolve_caller(caller_email)
            .await?
            .ok_or_else(|| OrderError::not_found("User", caller_email))?;

        let orders = self.db.orders().find_by_owner(&owner.id).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            views.push(self.view(order).await?);
        }

        debug!(user_id = %owner.id, count = views.len(), "Listed orders");
        Ok(views)
    }

    /// Loads an order and checks that `caller_email` owns it.
    pub(crate) async fn authorized_order(&self, order_id: &str, caller_email: &str) -> OrderResult<Order> {
        let order = self
            .db
            .orders()
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Order", order_id))?;
        self.authorize(&order, caller_email).await?;
        Ok(order)
    }

    /// The one authorization predicate every read goes through.
    async fn authorize(&self, order: &Order, caller_email: &str) -> OrderResult<()> {
        let allowed = match self.resolve_caller(caller_email).await? {
            Some(caller) => order.is_owned_by(&caller.id),
            None => false,
        };

        if allowed {
            Ok(())
        } else {
            warn!(order_id = %order.id, caller = %caller_email, "Order read by non-owner");
            Err(OrderError::Forbidden {
                order_id: order.id.clone(),
            })
        }
    }

    async fn resolve_caller(&self, caller_email: &str) -> OrderResult<Option<User>> {
        Ok(self.db.users().get_by_email(caller_email).await?)
    }

    async fn view(&self, order: &Order) -> OrderResult<OrderView> {
        let items = self.db.orders().get_items(&order.id).await?;
        Ok(OrderView::from_parts(order, &items))
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Moves an order along a legal edge of the state machine.
    ///
    /// No ownership check: only trusted internal callers (reconciliation,
    /// back office) reach this. Fails with `InvalidTransition` carrying the
    /// order's current status when the edge is illegal or another
    /// transition won the race.
    pub async fn transition(&self, order_id: &str, to: OrderStatus) -> OrderResult<OrderView> {
        let orders = self.db.orders();
        let changed = orders
            .transition_status(order_id, OrderStatus::sources_of(to), to, self.clock.now())
            .await?;

        let order = orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::not_found("Order", order_id))?;

        if !changed {
            debug!(order_id = %order_id, from = %order.status, to = %to, "Transition rejected");
            return Err(OrderError::InvalidTransition { from: order.status, to });
        }

        info!(order_id = %order.id, code = ?order.code, status = %to, "Order status changed");
        self.view(&order).await
    }
}

fn out_of_range(field: &str) -> OrderError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}
