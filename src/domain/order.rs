use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::cart::CartItem;
use super::pricing::CartPrices;
use super::user::ShippingAddress;

/// Status a provider must report before an order counts as paid.
pub const PAYMENT_COMPLETED: &str = "COMPLETED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub email_address: String,
    pub price_paid: String,
}

impl PaymentResult {
    /// Placeholder stored when a provider-side order has been opened but not captured.
    pub fn pending(provider_order_id: impl Into<String>) -> Self {
        Self {
            id: provider_order_id.into(),
            status: String::new(),
            email_address: String::new(),
            price_paid: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub payment_result: Option<PaymentResult>,
    #[serde(flatten)]
    pub prices: CartPrices,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
    pub user: OrderCustomer,
}

/// Checkout details for turning a cart into an order. Items and prices are
/// read from the cart itself while it is locked.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub cart_id: Uuid,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlySales {
    /// `MM/YY`
    pub month: String,
    #[schema(value_type = String)]
    pub total_sales: BigDecimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LatestSale {
    pub id: Uuid,
    pub customer: String,
    #[schema(value_type = String)]
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderSummary {
    pub orders_count: i64,
    pub products_count: i64,
    pub users_count: i64,
    #[schema(value_type = String)]
    pub total_sales: BigDecimal,
    pub sales_data: Vec<MonthlySales>,
    pub latest_sales: Vec<LatestSale>,
}
