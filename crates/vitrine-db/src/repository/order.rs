//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Lifecycle (storage view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. SAVE                                                               │
//! │     └── save(order, items)   header + items in ONE transaction         │
//! │         UNIQUE(code) violation → DbError::UniqueViolation              │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── find_by_id / find_by_code / find_by_owner → header             │
//! │     └── get_items(order_id)                       → lines in order     │
//! │                                                                         │
//! │  3. TRANSITION                                                         │
//! │     └── transition_status(id, [pending], processing)                   │
//! │         UPDATE ... WHERE id = ? AND status IN (?)                      │
//! │         two racing callers: exactly one sees `true`                    │
//! │                                                                         │
//! │  4. (REPAIR ONLY) BACKFILL                                             │
//! │     └── find_missing_codes() → assign_code(id, code)                   │
//! │                                                                         │
//! │  Orders are never deleted.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vitrine_core::{Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = r#"
    id, user_id, code, status, total_cents,
    delivery_name, delivery_email, delivery_phone, delivery_address,
    delivery_city, delivery_region, delivery_postal_code, delivery_country,
    delivery_notes, created_at, updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, order_id, position, product_id, product_name,
    unit_price_cents, quantity, line_total_cents
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persists an order header and all its items atomically.
    ///
    /// Either everything is written or nothing is. A duplicate code
    /// surfaces as `DbError::UniqueViolation { field: "orders.code", .. }`
    /// and leaves no trace in the database.
    pub async fn save(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(
            order_id = %order.id,
            code = ?order.code,
            items = items.len(),
            "Saving order"
        );

        let mut tx = self.pool.begin().await?;

        let d = &order.delivery;
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, code, status, total_cents,
                delivery_name, delivery_email, delivery_phone, delivery_address,
                delivery_city, delivery_region, delivery_postal_code, delivery_country,
                delivery_notes, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15, ?16
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.code)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(&d.name)
        .bind(&d.email)
        .bind(&d.phone)
        .bind(&d.address)
        .bind(&d.city)
        .bind(&d.region)
        .bind(&d.postal_code)
        .bind(&d.country)
        .bind(&d.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, position, product_id, product_name,
                    unit_price_cents, quantity, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(item.position)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Moves an order to `to` if, and only if, it is currently in one of
    /// `from_allowed`.
    ///
    /// Returns `true` when the row changed. `false` means the order does
    /// not exist or was in another state; callers re-read to tell which.
    pub async fn transition_status(
        &self,
        id: &str,
        from_allowed: &[OrderStatus],
        to: OrderStatus,
        at: DateTime<Utc>,
    ) -> DbResult<bool> {
        if from_allowed.is_empty() {
            return Ok(false);
        }

        let placeholders = (0..from_allowed.len())
            .map(|i| format!("?{}", i + 4))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&sql).bind(to).bind(at).bind(id);
        for status in from_allowed {
            query = query.bind(*status);
        }

        let result = query.execute(&self.pool).await?;
        let changed = result.rows_affected() > 0;

        debug!(order_id = %id, to = %to, changed, "Conditional status update");
        Ok(changed)
    }

    /// Sets the code of an order that has none. Repair tooling only.
    ///
    /// Returns `false` if the order already had a code (or does not exist);
    /// assigned codes are never overwritten.
    pub async fn assign_code(&self, id: &str, code: &str) -> DbResult<bool> {
        let result =
            sqlx::query("UPDATE orders SET code = ?1, updated_at = ?2 WHERE id = ?3 AND code IS NULL")
                .bind(code)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        debug!(order_id = %id, "Finding order by id");

        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Order>> {
        debug!(code = %code, "Finding order by code");

        let sql = format!("SELECT {} FROM orders WHERE code = ?1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// All orders of one user, newest first.
    pub async fn find_by_owner(&self, user_id: &str) -> DbResult<Vec<Order>> {
        debug!(user_id = %user_id, "Finding orders by owner");

        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Every order, oldest first. Repair tooling only.
    pub async fn find_all(&self) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders ORDER BY created_at ASC, rowid ASC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Orders without a code, oldest first.
    pub async fn find_missing_codes(&self) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE code IS NULL ORDER BY created_at ASC, rowid ASC",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Line items of an order in cart order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY position",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Codes already issued on a day, e.g. `prefix = "ORD-20231211-"`.
    pub async fn codes_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            "SELECT code FROM orders WHERE code LIKE ?1 || '%' ORDER BY code",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
