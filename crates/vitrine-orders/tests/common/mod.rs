//! Shared fixtures for the order core integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;
use vitrine_core::{
    CreateOrderRequest, Currency, DeliveryInfo, NewOrderItem, OrderView, PaymentIntent, Product, User,
};
use vitrine_db::{Database, DbConfig};
use vitrine_orders::{
    FixedClock, GatewayAdapter, GatewayError, NotifyError, OrderLifecycle, OrderNotifier, PaymentGateway,
};

pub const ANA: &str = "ana@example.ro";
pub const BOGDAN: &str = "bogdan@example.ro";

/// 2023-12-11 10:00 UTC, the day every fixture order is placed on.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 11, 10, 0, 0).unwrap()
}

/// Routes service logs to the test harness; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_user(db: &Database, email: &str) -> User {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        display_name: email.to_string(),
        created_at: fixed_now(),
    };
    db.users().insert(&user).await.unwrap();
    user
}

pub async fn seed_product(db: &Database, name: &str, price_cents: i64) -> Product {
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price_cents,
        is_active: true,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    };
    db.products().insert(&product).await.unwrap();
    product
}

pub fn delivery() -> DeliveryInfo {
    DeliveryInfo {
        name: "Ana Popescu".to_string(),
        email: ANA.to_string(),
        phone: "+40 721 000 000".to_string(),
        address: "Str. Memorandumului 28".to_string(),
        city: "Cluj-Napoca".to_string(),
        region: Some("Cluj".to_string()),
        postal_code: Some("400114".to_string()),
        country: "RO".to_string(),
        notes: None,
    }
}

pub fn request(items: Vec<NewOrderItem>) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        delivery: delivery(),
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A lifecycle on an in-memory database, pinned to [`fixed_now`], with two
/// customers and a small catalog.
pub struct Harness {
    pub db: Database,
    pub clock: Arc<FixedClock>,
    pub lifecycle: Arc<OrderLifecycle>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub ana: User,
    pub bogdan: User,
    /// 10.00
    pub mug: Product,
    /// 5.00
    pub candle: Product,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_db(memory_db().await).await
    }

    pub async fn with_db(db: Database) -> Self {
        init_tracing();
        let clock = Arc::new(FixedClock::new(fixed_now()));
        let lifecycle = Arc::new(OrderLifecycle::new(db.clone()).with_clock(clock.clone()));

        let ana = seed_user(&db, ANA).await;
        let bogdan = seed_user(&db, BOGDAN).await;
        let mug = seed_product(&db, "Ceramic Mug", 1000).await;
        let candle = seed_product(&db, "Beeswax Candle", 500).await;

        Harness {
            db,
            clock,
            lifecycle,
            gateway: Arc::new(FakeGateway::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            ana,
            bogdan,
            mug,
            candle,
        }
    }

    pub fn adapter(&self) -> GatewayAdapter {
        GatewayAdapter::new(self.gateway.clone(), Duration::from_secs(5))
    }

    /// 2 × mug + 1 × candle, placed by Ana.
    pub async fn place_order(&self) -> OrderView {
        self.lifecycle
            .create_order(
                ANA,
                request(vec![
                    NewOrderItem::new(&self.mug.id, 2),
                    NewOrderItem::new(&self.candle.id, 1),
                ]),
            )
            .await
            .unwrap()
    }
}

// =============================================================================
// Fake Gateway
// =============================================================================

/// In-memory payment processor.
#[derive(Default)]
pub struct FakeGateway {
    intents: Mutex<HashMap<String, PaymentIntent>>,
    created: Mutex<Vec<PaymentIntent>>,
    counter: AtomicUsize,
    failing: AtomicBool,
}

impl FakeGateway {
    /// Makes every following call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Registers an intent as if it had been created earlier.
    pub fn insert_intent(&self, id: &str, order_id: Option<&str>) {
        let mut metadata = HashMap::new();
        if let Some(order_id) = order_id {
            metadata.insert("orderId".to_string(), order_id.to_string());
        }
        let intent = PaymentIntent {
            id: id.to_string(),
            amount: 100,
            currency: Currency::default(),
            client_secret: None,
            status: "succeeded".to_string(),
            metadata,
        };
        self.intents.lock().unwrap().insert(id.to_string(), intent);
    }

    /// Every intent created through the gateway, in order.
    pub fn created(&self) -> Vec<PaymentIntent> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &Currency,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("pi_test_{}", n);
        let intent = PaymentIntent {
            id: id.clone(),
            amount: amount_minor,
            currency: currency.clone(),
            client_secret: Some(format!("{}_secret", id)),
            status: "requires_payment_method".to_string(),
            metadata: metadata.clone(),
        };

        self.intents.lock().unwrap().insert(id, intent.clone());
        self.created.lock().unwrap().push(intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }

        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: format!("No such payment_intent: '{}'", intent_id),
            })
    }
}

// =============================================================================
// Recording Notifier
// =============================================================================

/// Remembers every confirmation; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OrderView>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OrderView> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn send_confirmation(&self, order: &OrderView) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("smtp unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(order.clone());
        Ok(())
    }
}
