use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::CurrentUser;
use crate::domain::review::{Review, ReviewInput};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// 1 to 5
    pub rating: i32,
    pub title: String,
    pub description: String,
}

/// GET /products/{id}/reviews
#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses((status = 200, description = "Reviews, newest first", body = [Review])),
    tag = "reviews"
)]
pub async fn list_for_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let reviews = web::block(move || state.reviews.list_for_product(product_id)).await??;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /products/{id}/reviews
///
/// Creates the user's review of a product, or replaces their earlier one.
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review saved", body = Review),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Product not found"),
    ),
    tag = "reviews"
)]
pub async fn upsert(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = ReviewInput {
        product_id: path.into_inner(),
        rating: body.rating,
        title: body.title,
        description: body.description,
    };

    let review = web::block(move || state.reviews.create_or_update(user.id, input)).await??;
    Ok(HttpResponse::Ok().json(review))
}

/// GET /products/{id}/reviews/mine
#[utoipa::path(
    get,
    path = "/products/{id}/reviews/mine",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "The user's review, or null", body = Review),
        (status = 401, description = "Not signed in"),
    ),
    tag = "reviews"
)]
pub async fn mine(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let review = web::block(move || state.reviews.mine(user.id, product_id)).await??;
    Ok(HttpResponse::Ok().json(review))
}
