use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, PaymentResult, PAYMENT_COMPLETED};
use crate::domain::ports::{OrderRepository, PaypalGateway, StripeGateway, StripeWebhookEvent};
use crate::domain::pricing::{from_cents, to_cents};

/// What a Stripe webhook delivery led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    OrderPaid(Uuid),
    /// Stripe redelivered a charge for an order that is already paid.
    AlreadyPaid(Uuid),
    Ignored(String),
}

impl WebhookOutcome {
    pub fn message(&self) -> String {
        match self {
            WebhookOutcome::OrderPaid(_) => "Order marked as paid".to_string(),
            WebhookOutcome::AlreadyPaid(_) => "Order already paid".to_string(),
            WebhookOutcome::Ignored(kind) => format!("Event {kind} ignored"),
        }
    }
}

/// Run a blocking repository call off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
}

pub struct PaymentService {
    orders: Arc<dyn OrderRepository>,
    paypal: Option<Arc<dyn PaypalGateway>>,
    stripe: Option<Arc<dyn StripeGateway>>,
}

impl PaymentService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        paypal: Option<Arc<dyn PaypalGateway>>,
        stripe: Option<Arc<dyn StripeGateway>>,
    ) -> Self {
        Self {
            orders,
            paypal,
            stripe,
        }
    }

    fn paypal(&self) -> Result<&Arc<dyn PaypalGateway>, DomainError> {
        self.paypal
            .as_ref()
            .ok_or_else(|| DomainError::Payment("PayPal is not configured".to_string()))
    }

    fn stripe(&self) -> Result<&Arc<dyn StripeGateway>, DomainError> {
        self.stripe
            .as_ref()
            .ok_or_else(|| DomainError::Payment("Stripe is not configured".to_string()))
    }

    async fn unpaid_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        let orders = self.orders.clone();
        let order = blocking(move || orders.find_by_id(order_id))
            .await?
            .ok_or(DomainError::NotFound("Order"))?;
        if order.is_paid {
            return Err(DomainError::Conflict("Order already paid".to_string()));
        }
        Ok(order)
    }

    async fn mark_paid(&self, order_id: Uuid, result: PaymentResult) -> Result<(), DomainError> {
        let orders = self.orders.clone();
        blocking(move || orders.mark_paid(order_id, Some(result))).await?;
        info!("Order {} marked as paid", order_id);
        Ok(())
    }

    /// Open a PayPal order for the order total and remember its id on the order.
    pub async fn create_paypal_order(&self, order_id: Uuid) -> Result<String, DomainError> {
        let paypal = self.paypal()?;
        let order = self.unpaid_order(order_id).await?;

        let paypal_order_id = paypal.create_order(&order.prices.total_price).await?;

        let orders = self.orders.clone();
        let pending = PaymentResult::pending(paypal_order_id.clone());
        blocking(move || orders.set_payment_result(order_id, &pending)).await?;

        info!("PayPal order {} opened for order {}", paypal_order_id, order_id);
        Ok(paypal_order_id)
    }

    /// Capture an approved PayPal order and mark the order paid.
    pub async fn approve_paypal_order(
        &self,
        order_id: Uuid,
        paypal_order_id: &str,
    ) -> Result<(), DomainError> {
        let paypal = self.paypal()?;
        let order = self.unpaid_order(order_id).await?;

        let capture = paypal.capture_payment(paypal_order_id).await?;

        let expected = order.payment_result.as_ref().map(|r| r.id.as_str());
        if expected != Some(capture.id.as_str()) || capture.status != PAYMENT_COMPLETED {
            warn!(
                "Rejected PayPal capture {} ({}) for order {}",
                capture.id, capture.status, order_id
            );
            return Err(DomainError::Payment("Paypal payment error".to_string()));
        }

        self.mark_paid(
            order_id,
            PaymentResult {
                id: capture.id,
                status: capture.status,
                email_address: capture.payer_email,
                price_paid: capture.amount.unwrap_or_default(),
            },
        )
        .await
    }

    /// Create a Stripe payment intent for the order total; returns the client secret.
    pub async fn create_stripe_intent(&self, order_id: Uuid) -> Result<String, DomainError> {
        let stripe = self.stripe()?;
        let order = self.unpaid_order(order_id).await?;
        stripe
            .create_payment_intent(to_cents(&order.prices.total_price), order.id)
            .await
    }

    /// Verify a Stripe webhook delivery and apply it.
    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<WebhookOutcome, DomainError> {
        let event = self.stripe()?.parse_webhook(payload, signature, now)?;

        let (charge_id, order_id, email, amount_cents) = match event {
            StripeWebhookEvent::ChargeSucceeded {
                charge_id,
                order_id,
                email,
                amount_cents,
            } => (charge_id, order_id, email, amount_cents),
            StripeWebhookEvent::Other(kind) => return Ok(WebhookOutcome::Ignored(kind)),
        };

        let order_id = order_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| {
                warn!("Stripe charge {} carries no valid orderId", charge_id);
                DomainError::InvalidInput("Charge metadata has no valid orderId".to_string())
            })?;

        let result = PaymentResult {
            id: charge_id,
            status: PAYMENT_COMPLETED.to_string(),
            email_address: email,
            price_paid: from_cents(amount_cents).to_string(),
        };
        match self.mark_paid(order_id, result).await {
            Ok(()) => Ok(WebhookOutcome::OrderPaid(order_id)),
            Err(DomainError::Conflict(_)) => {
                info!("Stripe redelivered charge for paid order {}", order_id);
                Ok(WebhookOutcome::AlreadyPaid(order_id))
            }
            Err(e) => Err(e),
        }
    }
}
