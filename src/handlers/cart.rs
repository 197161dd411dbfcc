use actix_web::{web, HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::{CartSession, MaybeUser};
use crate::application::cart_service::change_message;
use crate::domain::cart::Cart;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartChangeResponse {
    pub success: bool,
    pub message: String,
    pub cart: Cart,
}

fn with_cart_cookie(mut builder: HttpResponseBuilder, session: &CartSession) -> HttpResponseBuilder {
    if let Some(cookie) = session.new_cookie() {
        builder.cookie(cookie);
    }
    builder
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
///
/// The visitor's cart: the user's cart when signed in, otherwise the session cart.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Current cart, or null when none exists", body = Cart),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    session: CartSession,
) -> Result<HttpResponse, AppError> {
    let identity = session.identity(user.as_ref());
    let cart = web::block(move || state.carts.get(&identity)).await??;
    Ok(with_cart_cookie(HttpResponse::Ok(), &session).json(cart))
}

/// POST /cart/items
///
/// Adds one unit of the product, creating the cart on first use.
#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added", body = CartChangeResponse),
        (status = 400, description = "Not enough stock"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    session: CartSession,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = session.identity(user.as_ref());
    let product_id = body.into_inner().product_id;

    let (cart, change, product) =
        web::block(move || state.carts.add(&identity, product_id)).await??;

    Ok(with_cart_cookie(HttpResponse::Ok(), &session).json(CartChangeResponse {
        success: true,
        message: change_message(change, &product),
        cart,
    }))
}

/// DELETE /cart/items/{product_id}
///
/// Removes one unit of the product; the line disappears when it reaches zero.
#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Item removed", body = CartChangeResponse),
        (status = 404, description = "Cart, product or cart item not found"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    MaybeUser(user): MaybeUser,
    session: CartSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let identity = session.identity(user.as_ref());
    let product_id = path.into_inner();

    let (cart, change, product) =
        web::block(move || state.carts.remove(&identity, product_id)).await??;

    Ok(with_cart_cookie(HttpResponse::Ok(), &session).json(CartChangeResponse {
        success: true,
        message: change_message(change, &product),
        cart,
    }))
}
