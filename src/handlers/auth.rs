use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::session::{expired_session_cookie, session_cookie, session_token, CartSession};
use super::MessageResponse;
use crate::domain::user::{SignUp, User};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignInResponse {
    pub success: bool,
    /// Bearer token; also set as the `session_token` cookie.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /auth/sign-up
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "auth"
)]
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let form = SignUp {
        name: body.name,
        email: body.email,
        password: body.password,
        confirm_password: body.confirm_password,
    };

    let user = web::block(move || state.auth.sign_up(form)).await??;
    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/sign-in
///
/// Opens a session and adopts the visitor's anonymous cart.
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "auth"
)]
pub async fn sign_in(
    state: web::Data<AppState>,
    session: CartSession,
    body: web::Json<SignInRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let session_cart_id = (!session.is_new).then(|| session.id.clone());
    let max_age_days = state.session_max_age_days;

    let issued = web::block(move || {
        state
            .auth
            .sign_in(&body.email, &body.password, session_cart_id.as_deref())
    })
    .await??;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&issued.token, max_age_days))
        .json(SignInResponse {
            success: true,
            token: issued.token,
            expires_at: issued.expires_at,
            user: issued.user,
        }))
}

/// POST /auth/sign-out
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses((status = 200, description = "Session closed", body = MessageResponse)),
    tag = "auth"
)]
pub async fn sign_out(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = session_token(&req) {
        web::block(move || state.auth.sign_out(&token)).await??;
    }
    Ok(HttpResponse::Ok()
        .cookie(expired_session_cookie())
        .json(MessageResponse::ok("Signed out")))
}
