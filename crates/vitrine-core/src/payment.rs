//! # Payment Types
//!
//! The gateway-neutral shapes the order core exchanges with a payment
//! processor. Nothing here is persisted: an intent is only a correlation
//! handle that points back at an order through its metadata.
//!
//! ```text
//!   Order (id, total) ──► IntentRequest ──► gateway ──► PaymentIntent
//!                                                        │ metadata.orderId
//!   Order status  ◄── reconciliation ◄── PaymentSignal ◄─┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_CURRENCY, ORDER_ID_METADATA_KEY};

// =============================================================================
// Currency
// =============================================================================

/// An ISO-4217 style currency code, normalised to lowercase (`ron`, `eur`).
///
/// The core does no conversion; it only checks the shape and passes the
/// code through to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parses a currency code. Three ASCII letters, any case.
    ///
    /// ```rust
    /// use vitrine_core::Currency;
    ///
    /// assert_eq!(Currency::parse("RON").unwrap().as_str(), "ron");
    /// assert!(Currency::parse("lei!").is_err());
    /// ```
    pub fn parse(code: &str) -> CoreResult<Self> {
        let code = code.trim();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(Currency(code.to_ascii_lowercase()))
        } else {
            Err(CoreError::InvalidCurrency(code.to_string()))
        }
    }

    /// Parses `code` if given, otherwise returns the default currency.
    pub fn parse_or_default(code: Option<&str>) -> CoreResult<Self> {
        match code {
            Some(c) => Self::parse(c),
            None => Ok(Self::default()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency(DEFAULT_CURRENCY.to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

// =============================================================================
// Intent Creation
// =============================================================================

/// Raw intent creation input as the storefront sends it.
///
/// `amount` is in major units (25.00 means 25 lei). It is converted to minor
/// units exactly once, by truncation, inside the gateway adapter.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    #[ts(type = "number")]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// What the storefront needs to confirm the payment client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

// =============================================================================
// Payment Intent
// =============================================================================

/// A payment intent as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: Currency,
    /// Only present on freshly created intents.
    pub client_secret: Option<String>,
    /// Gateway-side status string (`requires_payment_method`, `succeeded`, ...).
    pub status: String,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    /// The order this intent was created for, if it was created for one.
    ///
    /// Blank values count as absent.
    pub fn order_id(&self) -> Option<&str> {
        self.metadata
            .get(ORDER_ID_METADATA_KEY)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Outcome Signals
// =============================================================================

/// Final outcome of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
}

impl fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentOutcome::Succeeded => f.write_str("succeeded"),
            PaymentOutcome::Failed => f.write_str("failed"),
        }
    }
}

/// "Intent X succeeded/failed", as delivered by a webhook or a poller.
///
/// Signals may be delivered more than once; consumers must be idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSignal {
    pub payment_intent_id: String,
    pub outcome: PaymentOutcome,
}

// =============================================================================
// Unit Tests
// =============================================================================
