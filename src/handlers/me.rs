use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::session::CurrentUser;
use super::PageParams;
use crate::domain::order::Order;
use crate::domain::page::Page;
use crate::domain::user::{ShippingAddress, User};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    /// Methods the shopper may choose at checkout.
    pub payment_methods: Vec<String>,
    pub default_payment_method: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentMethodRequest {
    pub payment_method: String,
}

/// GET /me
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Signed-in user", body = ProfileResponse),
        (status = 401, description = "Not signed in"),
    ),
    tag = "me"
)]
pub async fn profile(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ProfileResponse {
        user,
        payment_methods: state.checkout.payment_methods().to_vec(),
        default_payment_method: state.default_payment_method.clone(),
    }))
}

/// PUT /me/profile
#[utoipa::path(
    put,
    path = "/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Name too short"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "me"
)]
pub async fn update_profile(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let name = body.into_inner().name;
    let user = web::block(move || state.auth.update_profile(user.id, &name)).await??;
    Ok(HttpResponse::Ok().json(user))
}

/// PUT /me/address
#[utoipa::path(
    put,
    path = "/me/address",
    request_body = ShippingAddress,
    responses(
        (status = 200, description = "Shipping address saved", body = User),
        (status = 400, description = "Address validation failed"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "me"
)]
pub async fn update_address(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<ShippingAddress>,
) -> Result<HttpResponse, AppError> {
    let address = body.into_inner();
    let user = web::block(move || state.checkout.update_address(user.id, address)).await??;
    Ok(HttpResponse::Ok().json(user))
}

/// PUT /me/payment-method
#[utoipa::path(
    put,
    path = "/me/payment-method",
    request_body = UpdatePaymentMethodRequest,
    responses(
        (status = 200, description = "Payment method saved", body = User),
        (status = 400, description = "Unknown payment method"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "me"
)]
pub async fn update_payment_method(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<UpdatePaymentMethodRequest>,
) -> Result<HttpResponse, AppError> {
    let method = body.into_inner().payment_method;
    let user =
        web::block(move || state.checkout.update_payment_method(user.id, &method)).await??;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /me/orders
#[utoipa::path(
    get,
    path = "/me/orders",
    params(PageParams),
    responses(
        (status = 200, description = "The user's orders, newest first", body = Page<Order>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "me"
)]
pub async fn my_orders(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let page = query.request(state.catalog.page_size());
    let orders = web::block(move || state.orders.list_for_user(user.id, page)).await??;
    Ok(HttpResponse::Ok().json(orders))
}
