//! Back-office endpoints. Every handler requires an [`AdminUser`].

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::AdminUser;
use super::{MessageResponse, PageParams};
use crate::domain::order::{Order, OrderSummary};
use crate::domain::page::Page;
use crate::domain::pricing::parse_price;
use crate::domain::product::{Product, ProductFilter, ProductInput};
use crate::domain::user::{Role, User};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub stock: i32,
    pub images: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub banner: Option<String>,
    /// Decimal price as a string with two decimal places, e.g. "59.99"
    pub price: String,
}

impl ProductRequest {
    fn into_input(self) -> Result<ProductInput, AppError> {
        Ok(ProductInput {
            price: parse_price(&self.price)?,
            name: self.name,
            slug: self.slug,
            category: self.category,
            brand: self.brand,
            description: self.description,
            stock: self.stock,
            images: self.images,
            is_featured: self.is_featured,
            banner: self.banner.filter(|b| !b.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: String,
    pub role: Role,
}

// ── Dashboard ────────────────────────────────────────────────────────────────

/// GET /admin/summary
#[utoipa::path(
    get,
    path = "/admin/summary",
    responses(
        (status = 200, description = "Sales overview", body = OrderSummary),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
pub async fn summary(
    state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || state.orders.summary()).await??;
    Ok(HttpResponse::Ok().json(summary))
}

// ── Products ─────────────────────────────────────────────────────────────────

/// GET /admin/products
#[utoipa::path(
    get,
    path = "/admin/products",
    params(PageParams),
    responses(
        (status = 200, description = "Products, newest first", body = Page<Product>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.request(state.catalog.page_size());
    let filter = ProductFilter::from_params(
        params.query.as_deref(),
        None,
        None,
        None,
        None,
    )?;
    let products = web::block(move || state.catalog.search(&filter, page)).await??;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /admin/products/{id}
#[utoipa::path(
    get,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = web::block(move || state.catalog.by_id(id)).await??;
    Ok(HttpResponse::Ok().json(product))
}

/// POST /admin/products
#[utoipa::path(
    post,
    path = "/admin/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Slug already in use"),
    ),
    tag = "admin"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_input()?;
    let product = web::block(move || state.catalog.create(input)).await??;
    Ok(HttpResponse::Created().json(product))
}

/// PUT /admin/products/{id}
#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Slug already in use"),
    ),
    tag = "admin"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner().into_input()?;
    let product = web::block(move || state.catalog.update(id, input)).await??;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /admin/products/{id}
#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || state.catalog.delete(id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Product deleted successfully")))
}

// ── Orders ───────────────────────────────────────────────────────────────────

/// GET /admin/orders
///
/// All orders, newest first; `query` filters on the customer's name.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(PageParams),
    responses(
        (status = 200, description = "Orders, newest first", body = Page<Order>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.request(state.catalog.page_size());
    let orders =
        web::block(move || state.orders.list_all(params.query.as_deref(), page)).await??;
    Ok(HttpResponse::Ok().json(orders))
}

/// DELETE /admin/orders/{id}
#[utoipa::path(
    delete,
    path = "/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || state.orders.delete(id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Order deleted successfully")))
}

/// POST /admin/orders/{id}/pay
///
/// Records a cash-on-delivery payment.
#[utoipa::path(
    post,
    path = "/admin/orders/{id}/pay",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order marked as paid", body = MessageResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already paid"),
    ),
    tag = "admin"
)]
pub async fn mark_paid(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || state.orders.mark_paid(id, None)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Order marked as paid")))
}

/// POST /admin/orders/{id}/deliver
#[utoipa::path(
    post,
    path = "/admin/orders/{id}/deliver",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order marked as delivered", body = MessageResponse),
        (status = 400, description = "Order is not paid"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn mark_delivered(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || state.orders.mark_delivered(id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Order marked as delivered")))
}

// ── Users ────────────────────────────────────────────────────────────────────

/// GET /admin/users
#[utoipa::path(
    get,
    path = "/admin/users",
    params(PageParams),
    responses(
        (status = 200, description = "Users, newest first", body = Page<User>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.request(state.catalog.page_size());
    let users =
        web::block(move || state.auth.list_users(params.query.as_deref(), page)).await??;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /admin/users/{id}
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found"),
    ),
    tag = "admin"
)]
pub async fn get_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let user = web::block(move || state.auth.user(id)).await??;
    Ok(HttpResponse::Ok().json(user))
}

/// PUT /admin/users/{id}
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "User not found"),
    ),
    tag = "admin"
)]
pub async fn update_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let user = web::block(move || state.auth.update_user(id, &body.name, body.role)).await??;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /admin/users/{id}
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found"),
    ),
    tag = "admin"
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    web::block(move || state.auth.delete_user(id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("User deleted successfully")))
}
