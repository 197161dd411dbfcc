use async_trait::async_trait;
use hmac::{Hmac, Mac};
use log::{error, info};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::config::StripeSettings;
use crate::domain::errors::DomainError;
use crate::domain::ports::{StripeGateway, StripeWebhookEvent};

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const CHARGE_SUCCEEDED: &str = "charge.succeeded";

pub struct StripeClient {
    http: reqwest::Client,
    settings: StripeSettings,
}

impl StripeClient {
    pub fn new(settings: StripeSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    client_secret: String,
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        order_id: Uuid,
    ) -> Result<String, DomainError> {
        let intent: PaymentIntent = self
            .http
            .post(format!("{}/v1/payment_intents", self.settings.api_url))
            .bearer_auth(&self.settings.secret_key)
            .form(&[
                ("amount", amount_cents.to_string()),
                ("currency", "usd".to_string()),
                ("metadata[orderId]", order_id.to_string()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                error!("Stripe payment intent for order {} failed: {}", order_id, e);
                DomainError::Payment("Stripe payment intent failed".to_string())
            })?
            .json()
            .await
            .map_err(|e| {
                error!("Stripe payment intent response unreadable: {}", e);
                DomainError::Payment("Stripe payment intent failed".to_string())
            })?;

        info!("Created Stripe payment intent {} for order {}", intent.id, order_id);
        Ok(intent.client_secret)
    }

    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<StripeWebhookEvent, DomainError> {
        let event = construct_event(payload, signature, &self.settings.webhook_secret, now)?;
        if event.kind != CHARGE_SUCCEEDED {
            return Ok(StripeWebhookEvent::Other(event.kind));
        }

        let charge: Charge = serde_json::from_value(event.data.object)
            .map_err(|e| DomainError::InvalidInput(format!("Malformed Stripe charge: {e}")))?;
        Ok(StripeWebhookEvent::ChargeSucceeded {
            charge_id: charge.id,
            order_id: charge.metadata.order_id,
            email: charge.billing_details.email.unwrap_or_default(),
            amount_cents: charge.amount,
        })
    }
}

// ── Webhooks ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Charge {
    id: String,
    /// In cents.
    amount: i64,
    #[serde(default)]
    metadata: ChargeMetadata,
    #[serde(default)]
    billing_details: BillingDetails,
}

#[derive(Debug, Default, Deserialize)]
struct ChargeMetadata {
    #[serde(rename = "orderId")]
    order_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BillingDetails {
    email: Option<String>,
}

fn invalid_signature() -> DomainError {
    DomainError::InvalidInput("Invalid Stripe signature".to_string())
}

/// Check a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`) against `payload`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), DomainError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(invalid_signature)?;
    let within_tolerance = now
        .checked_sub(timestamp)
        .map(i64::unsigned_abs)
        .is_some_and(|age| age <= SIGNATURE_TOLERANCE_SECS.unsigned_abs());
    if !within_tolerance {
        return Err(DomainError::InvalidInput(
            "Stripe signature timestamp outside tolerance".to_string(),
        ));
    }

    let matches = signatures.iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    });

    if matches {
        Ok(())
    } else {
        Err(invalid_signature())
    }
}

fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<StripeEvent, DomainError> {
    verify_signature(payload, header, secret, now)?;
    serde_json::from_slice(payload)
        .map_err(|e| DomainError::InvalidInput(format!("Malformed Stripe event: {e}")))
}
