use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::CurrentUser;
use super::MessageResponse;
use crate::application::checkout_service::Placement;
use crate::domain::order::Order;
use crate::domain::user::User;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub message: String,
    /// Where the client should go next: the new order, or the missing checkout step.
    pub redirect_to: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaypalOrderResponse {
    pub success: bool,
    pub paypal_order_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovePaypalRequest {
    pub paypal_order_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StripeIntentResponse {
    pub client_secret: String,
}

/// Load an order the viewer owns (or any order, for admins).
async fn visible_order(
    state: &web::Data<AppState>,
    viewer: User,
    order_id: Uuid,
) -> Result<Order, AppError> {
    let state = state.clone();
    Ok(web::block(move || state.orders.get_for(&viewer, order_id)).await??)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Turns the signed-in user's cart into an order. When a checkout step is
/// missing no order is created and `redirect_to` names the step.
#[utoipa::path(
    post,
    path = "/orders",
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 200, description = "Checkout incomplete", body = PlaceOrderResponse),
        (status = 401, description = "Not signed in"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<HttpResponse, AppError> {
    let placement = web::block(move || state.checkout.place_order(user.id)).await??;
    let redirect_to = placement.redirect_to();

    Ok(match placement {
        Placement::Placed { .. } => HttpResponse::Created().json(PlaceOrderResponse {
            success: true,
            message: "Order created".to_string(),
            redirect_to,
        }),
        Placement::Incomplete { message, .. } => HttpResponse::Ok().json(PlaceOrderResponse {
            success: false,
            message: message.to_string(),
            redirect_to,
        }),
    })
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = visible_order(&state, user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /orders/{id}/paypal
///
/// Opens a PayPal order for the order total.
#[utoipa::path(
    post,
    path = "/orders/{id}/paypal",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "PayPal order opened", body = PaypalOrderResponse),
        (status = 402, description = "PayPal rejected the request"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already paid"),
    ),
    tag = "payments"
)]
pub async fn create_paypal_order(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = visible_order(&state, user, path.into_inner()).await?;
    let paypal_order_id = state.payments.create_paypal_order(order.id).await?;
    Ok(HttpResponse::Ok().json(PaypalOrderResponse {
        success: true,
        paypal_order_id,
    }))
}

/// POST /orders/{id}/paypal/approve
///
/// Captures the approved PayPal order and marks the order paid.
#[utoipa::path(
    post,
    path = "/orders/{id}/paypal/approve",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = ApprovePaypalRequest,
    responses(
        (status = 200, description = "Order paid", body = MessageResponse),
        (status = 402, description = "Capture failed or does not match the order"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already paid"),
    ),
    tag = "payments"
)]
pub async fn approve_paypal_order(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ApprovePaypalRequest>,
) -> Result<HttpResponse, AppError> {
    let order = visible_order(&state, user, path.into_inner()).await?;
    state
        .payments
        .approve_paypal_order(order.id, &body.paypal_order_id)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Your order has been paid")))
}

/// POST /orders/{id}/stripe-intent
///
/// Creates a Stripe payment intent for the order total, billed in cents.
#[utoipa::path(
    post,
    path = "/orders/{id}/stripe-intent",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Payment intent created", body = StripeIntentResponse),
        (status = 402, description = "Stripe rejected the request"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already paid"),
    ),
    tag = "payments"
)]
pub async fn create_stripe_intent(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = visible_order(&state, user, path.into_inner()).await?;
    let client_secret = state.payments.create_stripe_intent(order.id).await?;
    Ok(HttpResponse::Ok().json(StripeIntentResponse { client_secret }))
}
