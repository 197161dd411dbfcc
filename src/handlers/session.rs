//! Request extractors for the signed-in user and the anonymous cart cookie.

use std::future::{ready, Future, Ready};
use std::pin::Pin;

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::cart::CartIdentity;
use crate::domain::user::User;
use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_token";
pub const CART_COOKIE: &str = "session_cart_id";

/// The raw session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
}

pub fn session_cookie(token: &str, max_age_days: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(max_age_days))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .finish()
}

/// The signed-in user, if the request carries a live session.
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = session_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let Some(token) = token else {
                return Ok(MaybeUser(None));
            };
            let state =
                state.ok_or_else(|| AppError::Internal("application state missing".to_string()))?;
            let user = web::block(move || state.auth.authenticate(&token)).await??;
            Ok(MaybeUser(user))
        })
    }
}

/// A signed-in user; rejects the request with 401 otherwise.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let user = MaybeUser::from_request(req, payload);
        Box::pin(async move {
            match user.await? {
                MaybeUser(Some(user)) => Ok(CurrentUser(user)),
                MaybeUser(None) => Err(AppError::Unauthorized),
            }
        })
    }
}

/// A signed-in admin; 401 without a session, 403 for other roles.
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let user = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            let CurrentUser(user) = user.await?;
            if !user.is_admin() {
                return Err(AppError::Forbidden);
            }
            Ok(AdminUser(user))
        })
    }
}

/// The anonymous cart id from the `session_cart_id` cookie, minted on first contact.
pub struct CartSession {
    pub id: String,
    pub is_new: bool,
}

impl CartSession {
    pub fn identity(&self, user: Option<&User>) -> CartIdentity {
        CartIdentity {
            session_cart_id: self.id.clone(),
            user_id: user.map(|u| u.id),
        }
    }

    /// The cookie to set when the id was minted for this request.
    pub fn new_cookie(&self) -> Option<Cookie<'static>> {
        self.is_new.then(|| {
            Cookie::build(CART_COOKIE, self.id.clone())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish()
        })
    }
}

impl FromRequest for CartSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let existing = req
            .cookie(CART_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());

        ready(Ok(match existing {
            Some(id) => CartSession { id, is_new: false },
            None => CartSession {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }))
    }
}
