use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::pricing::CartPrices;
use super::product::Product;

/// A product snapshot held in a cart or copied onto an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    pub qty: i32,
    pub image: String,
    #[schema(value_type = String, example = "59.99")]
    pub price: BigDecimal,
}

impl CartItem {
    pub fn from_product(product: &Product, qty: i32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            qty,
            image: product.images.first().cloned().unwrap_or_default(),
            price: product.price.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_cart_id: String,
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub prices: CartPrices,
    pub created_at: DateTime<Utc>,
}

/// Who a cart belongs to: the signed-in user wins over the anonymous session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartIdentity {
    pub session_cart_id: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Incremented,
    Decremented,
    Removed,
}

/// Add one unit of `product` to `items`, respecting available stock.
pub fn add_item(items: &mut Vec<CartItem>, product: &Product) -> Result<CartChange, DomainError> {
    if let Some(existing) = items.iter_mut().find(|i| i.product_id == product.id) {
        if product.stock < existing.qty + 1 {
            return Err(DomainError::OutOfStock(product.name.clone()));
        }
        existing.qty += 1;
        return Ok(CartChange::Incremented);
    }

    if product.stock < 1 {
        return Err(DomainError::OutOfStock(product.name.clone()));
    }
    items.push(CartItem::from_product(product, 1));
    Ok(CartChange::Added)
}

/// Take one unit of `product_id` out of `items`, dropping the line at zero.
pub fn remove_item(items: &mut Vec<CartItem>, product_id: Uuid) -> Result<CartChange, DomainError> {
    let position = items
        .iter()
        .position(|i| i.product_id == product_id)
        .ok_or(DomainError::NotFound("Cart item"))?;

    if items[position].qty <= 1 {
        items.remove(position);
        Ok(CartChange::Removed)
    } else {
        items[position].qty -= 1;
        Ok(CartChange::Decremented)
    }
}
