pub mod admin;
pub mod auth;
pub mod cart;
pub mod me;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod session;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::page::PageRequest;

// ── Shared DTOs ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-based, default 1)
    pub page: Option<i64>,
    /// Items per page (max 100)
    pub limit: Option<i64>,
    /// Case-insensitive name filter; `all` disables it
    pub query: Option<String>,
}

impl PageParams {
    pub fn request(&self, default_limit: i64) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }
}
