//! Stripe payment intents over the REST API (no SDK dependency).
//!
//! ```text
//!   POST {base}/v1/payment_intents        form: amount, currency,
//!                                               automatic_payment_methods[enabled],
//!                                               metadata[orderId]
//!   GET  {base}/v1/payment_intents/{id}   id: [A-Za-z0-9_]+ only
//! ```
//!
//! Authentication is HTTP basic with the secret key as user name. The key
//! and base URL are given to the constructor; nothing is read from globals.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use vitrine_core::{Currency, PaymentIntent};

use super::{GatewayError, PaymentGateway};
use crate::config::GatewaySettings;

/// HTTP client for a Stripe-compatible payment API.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        StripeGateway {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    /// Builds a client from the `[gateway]` config section.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        if !settings.is_configured() {
            return Err(GatewayError::Transport("gateway.api_key is not configured".into()));
        }
        Ok(Self::new(settings.base_url.clone(), settings.api_key.clone()))
    }

    fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.base_url)
    }

    /// URL of a single intent. The id becomes exactly one path segment.
    fn intent_url(&self, intent_id: &str) -> Result<reqwest::Url, GatewayError> {
        if !is_intent_id(intent_id) {
            return Err(GatewayError::InvalidIntentId(intent_id.to_string()));
        }

        let mut url = reqwest::Url::parse(&self.intents_url())
            .map_err(|e| GatewayError::Transport(format!("invalid gateway base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport("gateway base URL cannot carry a path".into()))?
            .push(intent_id);
        Ok(url)
    }

    async fn read_intent(&self, response: reqwest::Response) -> Result<PaymentIntent, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_intent(&body)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &Currency,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, GatewayError> {
        let form = intent_form(amount_minor, currency, metadata);
        debug!(url = %self.intents_url(), amount = amount_minor, "POST payment intent");

        let response = self
            .client
            .post(self.intents_url())
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.read_intent(response).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        let url = self.intent_url(intent_id)?;
        debug!(url = %url, "GET payment intent");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.read_intent(response).await
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Form fields for `POST /v1/payment_intents`, in a stable order.
fn intent_form(amount_minor: i64, currency: &Currency, metadata: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), amount_minor.to_string()),
        ("currency".to_string(), currency.to_string()),
        ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
    ];

    let mut keys: Vec<&String> = metadata.keys().collect();
    keys.sort();
    for key in keys {
        form.push((format!("metadata[{}]", key), metadata[key].clone()));
    }

    form
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    client_secret: Option<String>,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

fn parse_intent(body: &str) -> Result<PaymentIntent, GatewayError> {
    let raw: IntentBody =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let currency = Currency::parse(&raw.currency).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

    Ok(PaymentIntent {
        id: raw.id,
        amount: raw.amount,
        currency,
        client_secret: raw.client_secret,
        status: raw.status,
        metadata: raw.metadata,
    })
}

fn is_intent_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Pulls `error.message` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
