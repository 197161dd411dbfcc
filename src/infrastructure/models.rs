use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderCustomer, PaymentResult};
use crate::domain::pricing::CartPrices;
use crate::domain::product::Product;
use crate::domain::review::Review;
use crate::domain::user::{ShippingAddress, User, UserCredentials};
use crate::schema::{carts, order_items, orders, products, reviews, sessions, users};

fn from_json<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Internal(format!("Corrupt {what} column: {e}")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

// ── users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
    pub address: Option<Value>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_credentials(self) -> Result<UserCredentials, DomainError> {
        let password_hash = self.password_hash.clone();
        Ok(UserCredentials {
            user: self.into_domain()?,
            password_hash,
        })
    }

    pub fn into_domain(self) -> Result<User, DomainError> {
        let address = self
            .address
            .map(|a| from_json::<ShippingAddress>(a, "address"))
            .transpose()?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role.parse()?,
            address,
            payment_method: self.payment_method,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSessionRow<'a> {
    pub token_hash: &'a str,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

// ── products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub images: Vec<String>,
    pub brand: String,
    pub description: String,
    pub stock: i32,
    pub price: BigDecimal,
    pub rating: BigDecimal,
    pub num_reviews: i32,
    pub is_featured: bool,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            slug: row.slug,
            category: row.category,
            images: row.images,
            brand: row.brand,
            description: row.description,
            stock: row.stock,
            price: row.price,
            rating: row.rating,
            num_reviews: row.num_reviews,
            is_featured: row.is_featured,
            banner: row.banner,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub images: Vec<String>,
    pub brand: String,
    pub description: String,
    pub stock: i32,
    pub price: BigDecimal,
    pub is_featured: bool,
    pub banner: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub fields: ProductChangeset,
}

// ── carts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_cart_id: String,
    pub items: Value,
    pub items_price: BigDecimal,
    pub total_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl CartRow {
    pub fn into_domain(self) -> Result<Cart, DomainError> {
        Ok(Cart {
            id: self.id,
            user_id: self.user_id,
            session_cart_id: self.session_cart_id,
            items: from_json::<Vec<CartItem>>(self.items, "cart items")?,
            prices: CartPrices {
                items_price: self.items_price,
                shipping_price: self.shipping_price,
                tax_price: self.tax_price,
                total_price: self.total_price,
            },
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_cart_id: String,
    #[diesel(embed)]
    pub contents: CartContents,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = carts)]
pub struct CartContents {
    pub items: Value,
    pub items_price: BigDecimal,
    pub total_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
}

impl CartContents {
    pub fn new(items: &[CartItem], prices: &CartPrices) -> Result<Self, DomainError> {
        Ok(Self {
            items: to_json(&items)?,
            items_price: prices.items_price.clone(),
            total_price: prices.total_price.clone(),
            shipping_price: prices.shipping_price.clone(),
            tax_price: prices.tax_price.clone(),
        })
    }
}

// ── orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address: Value,
    pub payment_method: String,
    pub payment_result: Option<Value>,
    pub items_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
    pub total_price: BigDecimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_domain(
        self,
        items: Vec<OrderItemRow>,
        customer: OrderCustomer,
    ) -> Result<Order, DomainError> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            shipping_address: from_json(self.shipping_address, "shipping address")?,
            payment_method: self.payment_method,
            payment_result: self
                .payment_result
                .map(|r| from_json::<PaymentResult>(r, "payment result"))
                .transpose()?,
            prices: CartPrices {
                items_price: self.items_price,
                shipping_price: self.shipping_price,
                tax_price: self.tax_price,
                total_price: self.total_price,
            },
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
            items: items.into_iter().map(CartItem::from).collect(),
            user: customer,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address: Value,
    pub payment_method: String,
    pub items_price: BigDecimal,
    pub shipping_price: BigDecimal,
    pub tax_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(primary_key(order_id, product_id))]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub qty: i32,
    pub price: BigDecimal,
    pub name: String,
    pub slug: String,
    pub image: String,
}

impl From<OrderItemRow> for CartItem {
    fn from(row: OrderItemRow) -> Self {
        CartItem {
            product_id: row.product_id,
            name: row.name,
            slug: row.slug,
            qty: row.qty,
            image: row.image,
            price: row.price,
        }
    }
}

// ── reviews ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub description: String,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    pub fn with_author(self, user_name: String) -> Review {
        Review {
            id: self.id,
            user_id: self.user_id,
            product_id: self.product_id,
            rating: self.rating,
            title: self.title,
            description: self.description,
            is_verified_purchase: self.is_verified_purchase,
            created_at: self.created_at,
            user_name,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub title: String,
    pub description: String,
    pub is_verified_purchase: bool,
}
