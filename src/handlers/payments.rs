use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;

use super::MessageResponse;
use crate::errors::AppError;
use crate::state::AppState;

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /webhooks/stripe
///
/// Verifies the `Stripe-Signature` header against the raw body and marks the
/// order paid on `charge.succeeded`. Redeliveries for a paid order and other
/// event types are acknowledged.
#[utoipa::path(
    post,
    path = "/webhooks/stripe",
    request_body(content = String, description = "Raw Stripe event JSON"),
    responses(
        (status = 200, description = "Event processed, already applied or ignored", body = MessageResponse),
        (status = 400, description = "Bad signature or malformed event"),
    ),
    tag = "payments"
)]
pub async fn stripe_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?
        .to_string();

    let outcome = state
        .payments
        .handle_stripe_webhook(&body, &signature, Utc::now().timestamp())
        .await?;

    info!("Stripe webhook handled: {:?}", outcome);
    Ok(HttpResponse::Ok().json(MessageResponse::ok(outcome.message())))
}
