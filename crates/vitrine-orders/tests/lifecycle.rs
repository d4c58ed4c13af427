//! Order creation, authorized reads and transitions.

mod common;

use chrono::{Duration, NaiveDate};
use common::*;
use uuid::Uuid;
use vitrine_core::{NewOrderItem, Order, OrderCode, OrderItem, OrderStatus, ValidationError};
use vitrine_orders::{OrderError, OrderLifecycle};

fn day() -> String {
    OrderCode::day_key(NaiveDate::from_ymd_opt(2023, 12, 11).unwrap())
}

/// Writes an order straight to the store, bypassing the counter.
async fn stored_order(h: &Harness, code: &str) {
    let order = Order {
        id: Uuid::new_v4().to_string(),
        user_id: h.bogdan.id.clone(),
        code: Some(code.to_string()),
        status: OrderStatus::Pending,
        total_cents: 1000,
        delivery: delivery(),
        created_at: fixed_now(),
        updated_at: fixed_now(),
    };
    let item = OrderItem {
        id: Uuid::new_v4().to_string(),
        order_id: order.id.clone(),
        position: 0,
        product_id: h.mug.id.clone(),
        product_name: h.mug.name.clone(),
        unit_price_cents: 1000,
        quantity: 1,
        line_total_cents: 1000,
    };
    h.db.orders().save(&order, &[item]).await.unwrap();
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn test_two_items_total_status_and_code() {
    let h = Harness::new().await;

    let view = h.place_order().await;

    assert_eq!(view.total_cents, 2500);
    assert_eq!(view.total().to_string(), "25.00");
    assert_eq!(view.status, OrderStatus::Pending);
    assert_eq!(view.code.as_deref(), Some("ORD-20231211-0001"));
    assert_eq!(view.created_at, fixed_now());
    assert_eq!(view.delivery, delivery());

    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].product_name, "Ceramic Mug");
    assert_eq!(view.items[0].quantity, 2);
    assert_eq!(view.items[0].unit_price_cents, 1000);
    assert_eq!(view.items[0].subtotal_cents, 2000);
    assert_eq!(view.items[1].product_name, "Beeswax Candle");
    assert_eq!(view.items[1].subtotal_cents, 500);

    let sum: i64 = view.items.iter().map(|i| i.unit_price_cents * i.quantity).sum();
    assert_eq!(sum, view.total_cents);

    // What was persisted reads back identically
    let stored = h.lifecycle.get_order(&view.id, ANA).await.unwrap();
    assert_eq!(stored, view);
}

#[tokio::test]
async fn test_same_day_codes_increase_without_gaps() {
    let h = Harness::new().await;

    let mut codes = Vec::new();
    for _ in 0..5 {
        codes.push(h.place_order().await.code.unwrap());
    }

    assert_eq!(
        codes,
        vec![
            "ORD-20231211-0001",
            "ORD-20231211-0002",
            "ORD-20231211-0003",
            "ORD-20231211-0004",
            "ORD-20231211-0005",
        ]
    );

    // A new day starts over
    h.clock.advance(Duration::days(1));
    assert_eq!(h.place_order().await.code.as_deref(), Some("ORD-20231212-0001"));
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_persisting() {
    let h = Harness::new().await;

    let empty = h.lifecycle.create_order(ANA, request(vec![])).await;
    assert!(matches!(empty, Err(OrderError::Validation(ValidationError::Required { .. }))));

    let zero = h
        .lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 0)]))
        .await;
    assert!(matches!(zero, Err(OrderError::Validation(_))));

    let negative = h
        .lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, -1)]))
        .await;
    assert!(matches!(negative, Err(OrderError::Validation(_))));

    let mut no_name = request(vec![NewOrderItem::new(&h.mug.id, 1)]);
    no_name.delivery.name = "  ".to_string();
    let err = h.lifecycle.create_order(ANA, no_name).await.unwrap_err();
    assert!(matches!(err, OrderError::Validation(ValidationError::Required { ref field }) if field == "delivery name"));

    let mut bad_email = request(vec![NewOrderItem::new(&h.mug.id, 1)]);
    bad_email.delivery.email = "not-an-email".to_string();
    assert!(matches!(
        h.lifecycle.create_order(ANA, bad_email).await,
        Err(OrderError::Validation(_))
    ));

    assert!(h.db.orders().find_all().await.unwrap().is_empty());
    assert_eq!(h.db.code_sequences().current(&day()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_caller_and_products() {
    let h = Harness::new().await;

    let err = h
        .lifecycle
        .create_order("nobody@example.ro", request(vec![NewOrderItem::new(&h.mug.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound { ref entity, .. } if entity == "User"));

    let err = h
        .lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new("no-such-product", 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound { ref entity, ref id } if entity == "Product" && id == "no-such-product"));

    h.db.products().set_active(&h.candle.id, false).await.unwrap();
    let err = h
        .lifecycle
        .create_order(
            ANA,
            request(vec![NewOrderItem::new(&h.mug.id, 1), NewOrderItem::new(&h.candle.id, 1)]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound { .. }));

    assert!(h.db.orders().find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_caller_email_is_case_insensitive() {
    let h = Harness::new().await;
    let view = h
        .lifecycle
        .create_order("  Ana@Example.RO ", request(vec![NewOrderItem::new(&h.mug.id, 1)]))
        .await
        .unwrap();
    assert!(h.lifecycle.get_order(&view.id, ANA).await.is_ok());
}

#[tokio::test]
async fn test_price_snapshot_must_match_catalog() {
    let h = Harness::new().await;

    let ok = h
        .lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 1).with_snapshot(1000)]))
        .await
        .unwrap();
    assert_eq!(ok.total_cents, 1000);

    let err = h
        .lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 1).with_snapshot(900)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::Validation(ValidationError::PriceChanged {
            catalog_cents: 1000,
            submitted_cents: 900,
            ..
        })
    ));
}

#[tokio::test]
async fn test_code_collision_is_retried_with_next_sequence() {
    let h = Harness::new().await;

    // A code written outside the counter, e.g. by an older import
    stored_order(&h, "ORD-20231211-0001").await;

    let view = h.place_order().await;
    assert_eq!(view.code.as_deref(), Some("ORD-20231211-0002"));
    assert_eq!(h.db.orders().find_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_conflict_surfaces_after_max_attempts() {
    let h = Harness::new().await;
    let lifecycle = OrderLifecycle::new(h.db.clone())
        .with_clock(h.clock.clone())
        .with_max_code_attempts(1);

    stored_order(&h, "ORD-20231211-0001").await;

    let err = lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ConflictRetryable { attempts: 1 }));
    assert!(err.is_retryable());

    // No partial order left behind
    assert_eq!(h.db.orders().find_all().await.unwrap().len(), 1);

    // The next attempt gets a fresh number
    let view = lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 1)]))
        .await
        .unwrap();
    assert_eq!(view.code.as_deref(), Some("ORD-20231211-0002"));
}

#[tokio::test]
async fn test_imported_codes_are_skipped_in_one_retry() {
    let h = Harness::new().await;
    let lifecycle = OrderLifecycle::new(h.db.clone())
        .with_clock(h.clock.clone())
        .with_max_code_attempts(2);

    // Same-day codes from an import that never touched the counter
    for seq in 1..=5 {
        stored_order(&h, &format!("ORD-20231211-{:04}", seq)).await;
    }

    let view = lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 1)]))
        .await
        .unwrap();
    assert_eq!(view.code.as_deref(), Some("ORD-20231211-0006"));
    assert_eq!(h.db.code_sequences().current(&day()).await.unwrap(), 6);
}

#[tokio::test]
async fn test_code_space_exhaustion_fails_loudly() {
    let h = Harness::new().await;
    h.db.code_sequences().advance_to(&day(), 9999).await.unwrap();

    let err = h
        .lifecycle
        .create_order(ANA, request(vec![NewOrderItem::new(&h.mug.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::CodeSpaceExhausted { date } if date == NaiveDate::from_ymd_opt(2023, 12, 11).unwrap()));
    assert!(h.db.orders().find_all().await.unwrap().is_empty());
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_reading_someone_elses_order_is_forbidden() {
    let h = Harness::new().await;
    let view = h.place_order().await;
    let code = view.code.clone().unwrap();

    assert!(matches!(
        h.lifecycle.get_order(&view.id, BOGDAN).await,
        Err(OrderError::Forbidden { .. })
    ));
    assert!(matches!(
        h.lifecycle.get_order_by_code(&code, BOGDAN).await,
        Err(OrderError::Forbidden { .. })
    ));
    assert!(matches!(
        h.lifecycle.get_order(&view.id, "stranger@example.ro").await,
        Err(OrderError::Forbidden { .. })
    ));

    assert_eq!(h.lifecycle.get_order_by_code(&code, ANA).await.unwrap().id, view.id);
}

#[tokio::test]
async fn test_missing_orders_are_not_found() {
    let h = Harness::new().await;

    assert!(matches!(
        h.lifecycle.get_order("no-such-order", ANA).await,
        Err(OrderError::NotFound { .. })
    ));
    assert!(matches!(
        h.lifecycle.get_order_by_code("ORD-20231211-0042", ANA).await,
        Err(OrderError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_orders_returns_only_callers_newest_first() {
    let h = Harness::new().await;

    let first = h.place_order().await;
    h.clock.advance(Duration::minutes(5));
    let second = h.place_order().await;
    h.lifecycle
        .create_order(BOGDAN, request(vec![NewOrderItem::new(&h.candle.id, 3)]))
        .await
        .unwrap();

    let mine = h.lifecycle.list_orders(ANA).await.unwrap();
    let ids: Vec<&str> = mine.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    assert!(mine.iter().all(|o| o.items.len() == 2));

    let theirs = h.lifecycle.list_orders(BOGDAN).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].total_cents, 1500);
}

// =============================================================================
// Transitions
// =============================================================================

#[tokio::test]
async fn test_processing_cannot_be_cancelled() {
    let h = Harness::new().await;
    let view = h.place_order().await;

    let moved = h.lifecycle.transition(&view.id, OrderStatus::Processing).await.unwrap();
    assert_eq!(moved.status, OrderStatus::Processing);

    let err = h
        .lifecycle
        .transition(&view.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Processing,
            to: OrderStatus::Cancelled
        }
    ));

    let current = h.lifecycle.get_order(&view.id, ANA).await.unwrap();
    assert_eq!(current.status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_no_way_back_to_pending() {
    let h = Harness::new().await;
    let view = h.place_order().await;
    h.lifecycle.transition(&view.id, OrderStatus::Cancelled).await.unwrap();

    for target in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Cancelled] {
        assert!(matches!(
            h.lifecycle.transition(&view.id, target).await,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                ..
            })
        ));
    }
}

#[tokio::test]
async fn test_transition_of_unknown_order() {
    let h = Harness::new().await;
    assert!(matches!(
        h.lifecycle.transition("no-such-order", OrderStatus::Processing).await,
        Err(OrderError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_view_serializes_camel_case() {
    let h = Harness::new().await;
    let view = h.place_order().await;

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["code"], "ORD-20231211-0001");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["totalCents"], 2500);
    assert_eq!(json["items"][0]["subtotalCents"], 2000);
    assert_eq!(json["delivery"]["postalCode"], "400114");
}
