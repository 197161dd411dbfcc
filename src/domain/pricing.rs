use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::cart::CartItem;
use super::errors::DomainError;

/// Orders whose item total is strictly above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: i64 = 100;
pub const FLAT_SHIPPING_PRICE: i64 = 10;
/// Sales tax as a percentage of the item total.
pub const TAX_RATE_PERCENT: i64 = 15;

/// The four price columns shared by carts and orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartPrices {
    #[schema(value_type = String, example = "129.90")]
    pub items_price: BigDecimal,
    #[schema(value_type = String, example = "0.00")]
    pub shipping_price: BigDecimal,
    #[schema(value_type = String, example = "19.49")]
    pub tax_price: BigDecimal,
    #[schema(value_type = String, example = "149.39")]
    pub total_price: BigDecimal,
}

impl CartPrices {
    /// Prices of a cart that has just been turned into an order.
    pub fn zero() -> Self {
        Self {
            items_price: money(BigDecimal::from(0)),
            shipping_price: money(BigDecimal::from(0)),
            tax_price: money(BigDecimal::from(0)),
            total_price: money(BigDecimal::from(0)),
        }
    }
}

/// Round half-up to cents.
pub fn money(value: BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

pub fn calculate_cart_prices(items: &[CartItem]) -> CartPrices {
    let items_price = money(
        items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| {
                acc + &item.price * BigDecimal::from(item.qty)
            }),
    );

    let shipping_price = if items_price > BigDecimal::from(FREE_SHIPPING_THRESHOLD) {
        money(BigDecimal::from(0))
    } else {
        money(BigDecimal::from(FLAT_SHIPPING_PRICE))
    };

    let tax_price = money(&items_price * BigDecimal::new(TAX_RATE_PERCENT.into(), 2));
    let total_price = money(&items_price + &tax_price + &shipping_price);

    CartPrices {
        items_price,
        shipping_price,
        tax_price,
        total_price,
    }
}

/// Parse a user-supplied price: non-negative with at most two decimal places.
pub fn parse_price(raw: &str) -> Result<BigDecimal, DomainError> {
    let value = BigDecimal::from_str(raw.trim())
        .map_err(|_| DomainError::InvalidInput(format!("Invalid price '{raw}'")))?;

    if value < BigDecimal::from(0) {
        return Err(DomainError::InvalidInput(
            "Price must not be negative".to_string(),
        ));
    }
    if value.with_scale(2) != value {
        return Err(DomainError::InvalidInput(
            "Price must have two decimal places".to_string(),
        ));
    }

    Ok(value.with_scale(2))
}

/// Whole cents for providers that bill in minor units.
pub fn to_cents(amount: &BigDecimal) -> i64 {
    let cents = money(amount * BigDecimal::from(100)).with_scale(0);
    cents.to_string().parse().unwrap_or(0)
}

pub fn from_cents(cents: i64) -> BigDecimal {
    money(BigDecimal::from(cents) / BigDecimal::from(100))
}
