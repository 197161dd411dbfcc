use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::{Cart, CartIdentity, CartItem};
use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderSummary, PaymentResult};
use super::page::{ListResult, PageRequest};
use super::pricing::CartPrices;
use super::product::{CategoryCount, Product, ProductFilter, ProductInput};
use super::review::{Review, ReviewInput};
use super::user::{NewUser, Role, ShippingAddress, User, UserCredentials};

pub trait ProductRepository: Send + Sync + 'static {
    fn latest(&self, limit: i64) -> Result<Vec<Product>, DomainError>;
    fn featured(&self, limit: i64) -> Result<Vec<Product>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError>;
    fn search(&self, filter: &ProductFilter, page: PageRequest)
        -> Result<ListResult<Product>, DomainError>;
    fn categories(&self) -> Result<Vec<CategoryCount>, DomainError>;
    fn create(&self, input: ProductInput) -> Result<Product, DomainError>;
    fn update(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn find(&self, identity: &CartIdentity) -> Result<Option<Cart>, DomainError>;
    fn create(
        &self,
        identity: &CartIdentity,
        items: &[CartItem],
        prices: &CartPrices,
    ) -> Result<Cart, DomainError>;
    fn save(&self, cart_id: Uuid, items: &[CartItem], prices: &CartPrices)
        -> Result<(), DomainError>;
    /// Hand the anonymous session cart to `user_id`, dropping the user's other carts.
    /// Returns `false` when there is no session cart.
    fn assign_to_user(&self, session_cart_id: &str, user_id: Uuid) -> Result<bool, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Lock the source cart, copy its current contents onto a new order and
    /// empty it, atomically. `None` when the locked cart has no items.
    fn create_from_cart(&self, order: NewOrder) -> Result<Option<Uuid>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_for_user(&self, user_id: Uuid, page: PageRequest)
        -> Result<ListResult<Order>, DomainError>;
    fn list_all(&self, customer_query: Option<&str>, page: PageRequest)
        -> Result<ListResult<Order>, DomainError>;
    fn set_payment_result(&self, id: Uuid, result: &PaymentResult) -> Result<(), DomainError>;
    /// Decrement stock for every item and flag the order paid, atomically.
    /// Fails with `Conflict` when the order is already paid.
    fn mark_paid(&self, id: Uuid, result: Option<PaymentResult>) -> Result<(), DomainError>;
    fn mark_delivered(&self, id: Uuid) -> Result<(), DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    fn has_paid_purchase(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, DomainError>;
    fn summary(&self) -> Result<OrderSummary, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    fn update_name(&self, id: Uuid, name: &str) -> Result<User, DomainError>;
    fn update_address(&self, id: Uuid, address: &ShippingAddress) -> Result<User, DomainError>;
    fn update_payment_method(&self, id: Uuid, method: &str) -> Result<User, DomainError>;
    fn update_name_and_role(&self, id: Uuid, name: &str, role: Role) -> Result<User, DomainError>;
    fn list(&self, query: Option<&str>, page: PageRequest) -> Result<ListResult<User>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait SessionRepository: Send + Sync + 'static {
    fn create(&self, token_hash: &str, user_id: Uuid, expires_at: DateTime<Utc>)
        -> Result<(), DomainError>;
    /// The user owning an unexpired session.
    fn find_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>, DomainError>;
    fn delete(&self, token_hash: &str) -> Result<(), DomainError>;
}

pub trait ReviewRepository: Send + Sync + 'static {
    /// Insert or replace the user's review and refresh the product's rating, atomically.
    fn upsert(&self, user_id: Uuid, input: &ReviewInput, verified: bool)
        -> Result<Review, DomainError>;
    fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError>;
    fn find_for_user(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaypalCapture {
    pub id: String,
    pub status: String,
    pub payer_email: String,
    pub amount: Option<String>,
}

#[async_trait]
pub trait PaypalGateway: Send + Sync + 'static {
    /// Open a CAPTURE-intent order; returns the PayPal order id.
    async fn create_order(&self, amount: &BigDecimal) -> Result<String, DomainError>;
    async fn capture_payment(&self, paypal_order_id: &str) -> Result<PaypalCapture, DomainError>;
}

/// A verified Stripe webhook, reduced to what the shop acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeWebhookEvent {
    ChargeSucceeded {
        charge_id: String,
        order_id: Option<String>,
        email: String,
        amount_cents: i64,
    },
    Other(String),
}

#[async_trait]
pub trait StripeGateway: Send + Sync + 'static {
    /// Create a payment intent and return its client secret.
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        order_id: Uuid,
    ) -> Result<String, DomainError>;

    /// Check the `Stripe-Signature` header against the raw body and decode the event.
    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<StripeWebhookEvent, DomainError>;
}
