use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::page::{Page, PageRequest};
use crate::domain::product::{CategoryCount, Product, ProductFilter};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductSearchParams {
    /// Case-insensitive name match; `all` or empty disables it
    pub query: Option<String>,
    /// Exact category; `all` or empty disables it
    pub category: Option<String>,
    /// Price range as `min-max`, e.g. `50-100`
    pub price: Option<String>,
    /// Minimum average rating
    pub rating: Option<String>,
    /// `lowest`, `highest`, `rating`; anything else sorts newest first
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /products/latest
#[utoipa::path(
    get,
    path = "/products/latest",
    responses((status = 200, description = "Newest products", body = [Product])),
    tag = "products"
)]
pub async fn latest(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.catalog.latest()).await??;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /products/featured
#[utoipa::path(
    get,
    path = "/products/featured",
    responses((status = 200, description = "Featured products", body = [Product])),
    tag = "products"
)]
pub async fn featured(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.catalog.featured()).await??;
    Ok(HttpResponse::Ok().json(products))
}

/// GET /products/categories
#[utoipa::path(
    get,
    path = "/products/categories",
    responses((status = 200, description = "Categories with product counts", body = [CategoryCount])),
    tag = "products"
)]
pub async fn categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.catalog.categories()).await??;
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /products
///
/// Filtered, sorted and paginated product search.
#[utoipa::path(
    get,
    path = "/products",
    params(ProductSearchParams),
    responses(
        (status = 200, description = "One page of products", body = Page<Product>),
        (status = 400, description = "Malformed price range or rating"),
    ),
    tag = "products"
)]
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<ProductSearchParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = ProductFilter::from_params(
        params.query.as_deref(),
        params.category.as_deref(),
        params.price.as_deref(),
        params.rating.as_deref(),
        params.sort.as_deref(),
    )?;
    let page = PageRequest::new(params.page, params.limit, state.catalog.page_size());

    let result = web::block(move || state.catalog.search(&filter, page)).await??;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /products/{slug}
#[utoipa::path(
    get,
    path = "/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let product = web::block(move || state.catalog.by_slug(&slug)).await??;
    Ok(HttpResponse::Ok().json(product))
}
