use async_trait::async_trait;
use bigdecimal::BigDecimal;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

use crate::config::PaypalSettings;
use crate::domain::errors::DomainError;
use crate::domain::ports::{PaypalCapture, PaypalGateway};
use crate::domain::pricing::money;

/// PayPal REST client using client-credentials OAuth.
pub struct PaypalClient {
    http: reqwest::Client,
    settings: PaypalSettings,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    payer: Option<Payer>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct Payer {
    #[serde(default)]
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    amount: Option<Amount>,
}

#[derive(Debug, Deserialize)]
struct Amount {
    value: String,
}

impl From<CaptureResponse> for PaypalCapture {
    fn from(response: CaptureResponse) -> Self {
        let amount = response
            .purchase_units
            .into_iter()
            .next()
            .and_then(|unit| unit.payments)
            .and_then(|payments| payments.captures.into_iter().next())
            .and_then(|capture| capture.amount)
            .map(|amount| amount.value);

        PaypalCapture {
            id: response.id,
            status: response.status,
            payer_email: response.payer.map(|p| p.email_address).unwrap_or_default(),
            amount,
        }
    }
}

fn payment_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    error!("PayPal {}: {}", context, e);
    DomainError::Payment(format!("PayPal {context} failed"))
}

impl PaypalClient {
    pub fn new(settings: PaypalSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    async fn access_token(&self) -> Result<String, DomainError> {
        let token: AccessToken = self
            .http
            .post(format!("{}/v1/oauth2/token", self.settings.api_url))
            .basic_auth(&self.settings.client_id, Some(&self.settings.app_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| payment_error("authentication", e))?
            .json()
            .await
            .map_err(|e| payment_error("authentication", e))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaypalGateway for PaypalClient {
    async fn create_order(&self, amount: &BigDecimal) -> Result<String, DomainError> {
        let token = self.access_token().await?;
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": "USD",
                    "value": money(amount.clone()).to_string(),
                }
            }]
        });

        let order: CreatedOrder = self
            .http
            .post(format!("{}/v2/checkout/orders", self.settings.api_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| payment_error("order creation", e))?
            .json()
            .await
            .map_err(|e| payment_error("order creation", e))?;

        info!("Created PayPal order {}", order.id);
        Ok(order.id)
    }

    async fn capture_payment(&self, paypal_order_id: &str) -> Result<PaypalCapture, DomainError> {
        let token = self.access_token().await?;

        let capture: CaptureResponse = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.settings.api_url, paypal_order_id
            ))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| payment_error("capture", e))?
            .json()
            .await
            .map_err(|e| payment_error("capture", e))?;

        info!("Captured PayPal order {} with status {}", capture.id, capture.status);
        Ok(capture.into())
    }
}
