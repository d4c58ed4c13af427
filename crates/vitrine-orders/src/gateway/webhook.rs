//! # Webhook Verification
//!
//! Turns a signed gateway callback into a [`PaymentSignal`].
//!
//! ```text
//!   Stripe-Signature: t=1702290000,v1=5257a869...,v1=...
//!
//!   expected = hex(HMAC-SHA256(secret, "{t}.{raw body}"))
//!   accept  ⇔  some v1 == expected  ∧  |now - t| ≤ tolerance
//! ```
//!
//! Verification must run on the raw body bytes, before any JSON parsing.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use vitrine_core::{PaymentOutcome, PaymentSignal};

type HmacSha256 = Hmac<Sha256>;

/// Default replay window.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Invalid signature header: {0}")]
    MalformedHeader(&'static str),

    #[error("Webhook signature mismatch")]
    SignatureMismatch,

    #[error("Webhook timestamp outside tolerance ({age_secs}s)")]
    TimestampOutOfTolerance { age_secs: i64 },

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Verifies a `Stripe-Signature` style header against the raw payload.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
) -> Result<(), WebhookError> {
    verify_webhook_signature_at(payload, header, secret, tolerance, Utc::now().timestamp())
}

/// Same as [`verify_webhook_signature`] with an explicit "now" (unix seconds).
pub fn verify_webhook_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Duration,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader("missing t="))?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader("missing v1="));
    }
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| WebhookError::MalformedHeader("timestamp is not a number"))?;

    let mac = signed_mac(payload, timestamp, secret)?;
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    // Saturates for absurd timestamps, which then fail the tolerance check
    let age = now.saturating_sub(ts);
    if age.unsigned_abs() > tolerance.as_secs() {
        return Err(WebhookError::TimestampOutOfTolerance { age_secs: age });
    }

    Ok(())
}

/// Builds the header value a sender would attach. Used by tests and local
/// webhook replay tooling.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, WebhookError> {
    let ts = timestamp.to_string();
    let mac = signed_mac(payload, &ts, secret)?;
    Ok(format!("t={},v1={}", ts, hex::encode(mac.finalize().into_bytes())))
}

fn signed_mac(payload: &[u8], timestamp: &str, secret: &str) -> Result<HmacSha256, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::MalformedHeader("unusable secret"))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

// =============================================================================
// Event Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: EventObject,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    id: String,
}

/// Maps a verified event body to an outcome signal.
///
/// `payment_intent.succeeded` and `payment_intent.payment_failed` produce a
/// signal; every other event type yields `Ok(None)`.
pub fn parse_webhook_event(payload: &[u8]) -> Result<Option<PaymentSignal>, WebhookError> {
    let event: Event =
        serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    let outcome = match event.event_type.as_str() {
        "payment_intent.succeeded" => PaymentOutcome::Succeeded,
        "payment_intent.payment_failed" => PaymentOutcome::Failed,
        other => {
            debug!(event_type = %other, "Ignoring webhook event");
            return Ok(None);
        }
    };

    Ok(Some(PaymentSignal {
        payment_intent_id: event.data.object.id,
        outcome,
    }))
}
