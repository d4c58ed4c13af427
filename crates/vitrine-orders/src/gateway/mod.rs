//! # Payment Gateway Adapter
//!
//! Translation layer between the order core and a payment processor.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CheckoutService / ReconciliationService                              │
//! │          │  Decimal amount, Option<currency>, Option<order id>         │
//! │          ▼                                                              │
//! │   ┌─────────────────────────────────────────────────────────────────┐  │
//! │   │ GatewayAdapter                                                  │  │
//! │   │  • trunc(amount × 100) → minor units, must be > 0               │  │
//! │   │  • currency shape check, default "ron"                          │  │
//! │   │  • metadata { orderId }                                         │  │
//! │   │  • every call bounded by tokio::time::timeout                   │  │
//! │   └──────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │  minor units, Currency, metadata    │
//! │                                  ▼                                      │
//! │   dyn PaymentGateway  ──►  StripeGateway (HTTP)  |  test doubles       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures here never touch order state; they come back as
//! [`OrderError::PaymentGateway`].

pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};
use vitrine_core::{Currency, IntentResponse, Money, PaymentIntent, ORDER_ID_METADATA_KEY};

use crate::config::GatewaySettings;
use crate::error::{OrderError, OrderResult};

pub use stripe::StripeGateway;

// =============================================================================
// Gateway Trait
// =============================================================================

/// Failure reported by a gateway implementation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network or TLS failure before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The processor answered with an error status.
    #[error("Gateway rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The processor answered with something we could not read.
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),

    /// An intent id that is not a plain processor identifier.
    #[error("Invalid payment intent id: {0:?}")]
    InvalidIntentId(String),
}

impl From<GatewayError> for OrderError {
    fn from(err: GatewayError) -> Self {
        OrderError::PaymentGateway(err.to_string())
    }
}

/// A payment processor that manages intents.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an intent for `amount_minor` minor units.
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &Currency,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetches an intent, including its metadata.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError>;
}

// =============================================================================
// Adapter
// =============================================================================

/// Wraps a [`PaymentGateway`] with amount conversion, correlation metadata
/// and timeouts.
#[derive(Clone)]
pub struct GatewayAdapter {
    gateway: Arc<dyn PaymentGateway>,
    timeout: Duration,
    default_currency: Currency,
}

impl GatewayAdapter {
    pub fn new(gateway: Arc<dyn PaymentGateway>, timeout: Duration) -> Self {
        GatewayAdapter {
            gateway,
            timeout,
            default_currency: Currency::default(),
        }
    }

    /// Builds an adapter from the `[gateway]` config section.
    pub fn from_settings(gateway: Arc<dyn PaymentGateway>, settings: &GatewaySettings) -> OrderResult<Self> {
        let default_currency = Currency::parse(&settings.default_currency)?;
        Ok(GatewayAdapter {
            gateway,
            timeout: settings.timeout(),
            default_currency,
        })
    }

    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an intent from a major-unit amount.
    ///
    /// `12.505` becomes `1250` minor units: the amount is truncated toward
    /// zero, never rounded. Zero, negative and unrepresentable amounts are
    /// rejected before the gateway is called.
    pub async fn create_intent(
        &self,
        amount: Decimal,
        currency: Option<&str>,
        order_id: Option<&str>,
    ) -> OrderResult<IntentResponse> {
        let minor = to_minor_units(amount)?;
        let currency = self.resolve_currency(currency)?;
        self.create_intent_minor(minor, &currency, order_id).await
    }

    /// Parses `code`, falling back to the configured default currency.
    pub fn resolve_currency(&self, code: Option<&str>) -> OrderResult<Currency> {
        match code {
            Some(code) => Ok(Currency::parse(code)?),
            None => Ok(self.default_currency.clone()),
        }
    }

    /// Creates an intent for an amount already in minor units.
    pub async fn create_intent_minor(
        &self,
        amount: Money,
        currency: &Currency,
        order_id: Option<&str>,
    ) -> OrderResult<IntentResponse> {
        if !amount.is_positive() {
            return Err(OrderError::gateway(format!(
                "Amount must be positive, got {} minor units",
                amount.cents()
            )));
        }

        let mut metadata = HashMap::new();
        if let Some(id) = order_id.map(str::trim).filter(|id| !id.is_empty()) {
            metadata.insert(ORDER_ID_METADATA_KEY.to_string(), id.to_string());
        }

        debug!(amount = amount.cents(), currency = %currency, order_id = ?order_id, "Creating payment intent");

        let intent = self
            .bounded("create_intent", self.gateway.create_intent(amount.cents(), currency, &metadata))
            .await?;

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            error!(intent_id = %intent.id, "Gateway returned an intent without client secret");
            OrderError::gateway(format!("Intent {} has no client secret", intent.id))
        })?;

        info!(intent_id = %intent.id, amount = amount.cents(), currency = %currency, order_id = ?order_id, "Payment intent created");

        Ok(IntentResponse {
            client_secret,
            payment_intent_id: intent.id,
        })
    }

    /// Fetches an intent with its metadata.
    pub async fn retrieve_intent(&self, intent_id: &str) -> OrderResult<PaymentIntent> {
        self.bounded("retrieve_intent", self.gateway.retrieve_intent(intent_id))
            .await
    }

    /// Runs one gateway call under the configured timeout.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> OrderResult<T>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "Gateway call failed");
                Err(e.into())
            }
            Err(_) => {
                error!(operation, timeout = ?self.timeout, "Gateway call timed out");
                Err(OrderError::gateway(format!(
                    "{} timed out after {}s",
                    operation,
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}

/// Converts a major-unit amount to positive minor units by truncation.
pub fn to_minor_units(amount: Decimal) -> OrderResult<Money> {
    let minor = Money::from_major_truncated(amount)
        .ok_or_else(|| OrderError::gateway(format!("Amount {} cannot be represented", amount)))?;

    if !minor.is_positive() {
        return Err(OrderError::gateway(format!("Amount must be positive, got {}", amount)));
    }

    Ok(minor)
}
