//! In-memory port implementations for service tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::{Cart, CartIdentity, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderCustomer, OrderSummary, PaymentResult};
use crate::domain::page::{ListResult, PageRequest};
use crate::domain::ports::{
    CartRepository, OrderRepository, PaypalCapture, PaypalGateway, ProductRepository,
    ReviewRepository, SessionRepository, StripeGateway, StripeWebhookEvent, UserRepository,
};
use crate::domain::pricing::{money, CartPrices};
use crate::domain::product::{CategoryCount, Product, ProductFilter, ProductInput};
use crate::domain::review::{Review, ReviewInput};
use crate::domain::user::{NewUser, Role, ShippingAddress, User, UserCredentials};

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> ListResult<T> {
    ListResult {
        total: items.len() as i64,
        items: items
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect(),
    }
}

// ── products ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryProducts {
    pub rows: Mutex<Vec<Product>>,
}

impl InMemoryProducts {
    pub fn insert(&self, name: &str, price: &str, stock: i32) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            category: "Men's Dress Shirts".to_string(),
            images: vec!["/images/sample.jpg".to_string()],
            brand: "Polo".to_string(),
            description: "In-memory product".to_string(),
            stock,
            price: BigDecimal::from_str(price).expect("valid decimal"),
            rating: BigDecimal::from(0),
            num_reviews: 0,
            is_featured: false,
            banner: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(product.clone());
        product
    }

    pub fn stock(&self, id: Uuid) -> i32 {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).map(|p| p.stock).unwrap_or_default()
    }
}

fn product_from_input(id: Uuid, input: ProductInput, created_at: DateTime<Utc>) -> Product {
    Product {
        id,
        name: input.name,
        slug: input.slug,
        category: input.category,
        images: input.images,
        brand: input.brand,
        description: input.description,
        stock: input.stock,
        price: input.price,
        rating: BigDecimal::from(0),
        num_reviews: 0,
        is_featured: input.is_featured,
        banner: input.banner,
        created_at,
    }
}

impl ProductRepository for InMemoryProducts {
    fn latest(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    fn featured(&self, limit: i64) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .latest(i64::MAX)?
            .into_iter()
            .filter(|p| p.is_featured)
            .take(limit as usize)
            .collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.slug == slug).cloned())
    }

    fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ListResult<Product>, DomainError> {
        let matching: Vec<Product> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                filter
                    .query
                    .as_ref()
                    .map_or(true, |q| p.name.to_lowercase().contains(&q.to_lowercase()))
            })
            .filter(|p| filter.category.as_ref().map_or(true, |c| &p.category == c))
            .cloned()
            .collect();
        Ok(page_of(&matching, page))
    }

    fn categories(&self) -> Result<Vec<CategoryCount>, DomainError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for product in self.rows.lock().unwrap().iter() {
            *counts.entry(product.category.clone()).or_default() += 1;
        }
        let mut categories: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        categories.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(categories)
    }

    fn create(&self, input: ProductInput) -> Result<Product, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.slug == input.slug) {
            return Err(DomainError::Conflict("Already exists: slug".to_string()));
        }
        let product = product_from_input(Uuid::new_v4(), input, Utc::now());
        rows.push(product.clone());
        Ok(product)
    }

    fn update(&self, id: Uuid, input: ProductInput) -> Result<Product, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::NotFound("Product"))?;
        *existing = product_from_input(id, input, existing.created_at);
        Ok(existing.clone())
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }
}

// ── carts ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCarts {
    pub rows: Mutex<Vec<Cart>>,
}

impl CartRepository for InMemoryCarts {
    fn find(&self, identity: &CartIdentity) -> Result<Option<Cart>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let found = match identity.user_id {
            Some(user_id) => rows.iter().rev().find(|c| c.user_id == Some(user_id)),
            None => rows
                .iter()
                .rev()
                .find(|c| c.session_cart_id == identity.session_cart_id),
        };
        Ok(found.cloned())
    }

    fn create(
        &self,
        identity: &CartIdentity,
        items: &[CartItem],
        prices: &CartPrices,
    ) -> Result<Cart, DomainError> {
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id: identity.user_id,
            session_cart_id: identity.session_cart_id.clone(),
            items: items.to_vec(),
            prices: prices.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(cart.clone());
        Ok(cart)
    }

    fn save(&self, cart_id: Uuid, items: &[CartItem], prices: &CartPrices) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let cart = rows
            .iter_mut()
            .find(|c| c.id == cart_id)
            .ok_or(DomainError::NotFound("Cart"))?;
        cart.items = items.to_vec();
        cart.prices = prices.clone();
        Ok(())
    }

    fn assign_to_user(&self, session_cart_id: &str, user_id: Uuid) -> Result<bool, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(cart_id) = rows
            .iter()
            .rev()
            .find(|c| c.session_cart_id == session_cart_id)
            .map(|c| c.id)
        else {
            return Ok(false);
        };
        rows.retain(|c| c.id == cart_id || c.user_id != Some(user_id));
        if let Some(cart) = rows.iter_mut().find(|c| c.id == cart_id) {
            cart.user_id = Some(user_id);
        }
        Ok(true)
    }
}

// ── users & sessions ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUsers {
    pub rows: Mutex<Vec<UserCredentials>>,
}

impl InMemoryUsers {
    pub fn insert(&self, name: &str, email: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            address: None,
            payment_method: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(UserCredentials {
            user: user.clone(),
            password_hash: None,
        });
        user
    }

    fn modify(&self, id: Uuid, change: impl FnOnce(&mut User)) -> Result<User, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let creds = rows
            .iter_mut()
            .find(|c| c.user.id == id)
            .ok_or(DomainError::NotFound("User"))?;
        change(&mut creds.user);
        Ok(creds.user.clone())
    }
}

impl UserRepository for InMemoryUsers {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.user.email == user.email) {
            return Err(DomainError::Conflict("User already exists".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            role: user.role,
            address: None,
            payment_method: None,
            created_at: Utc::now(),
        };
        rows.push(UserCredentials {
            user: created.clone(),
            password_hash: Some(user.password_hash),
        });
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.email == email)
            .cloned())
    }

    fn update_name(&self, id: Uuid, name: &str) -> Result<User, DomainError> {
        self.modify(id, |u| u.name = name.to_string())
    }

    fn update_address(&self, id: Uuid, address: &ShippingAddress) -> Result<User, DomainError> {
        self.modify(id, |u| u.address = Some(address.clone()))
    }

    fn update_payment_method(&self, id: Uuid, method: &str) -> Result<User, DomainError> {
        self.modify(id, |u| u.payment_method = Some(method.to_string()))
    }

    fn update_name_and_role(&self, id: Uuid, name: &str, role: Role) -> Result<User, DomainError> {
        self.modify(id, |u| {
            u.name = name.to_string();
            u.role = role;
        })
    }

    fn list(&self, query: Option<&str>, page: PageRequest) -> Result<ListResult<User>, DomainError> {
        let users: Vec<User> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.user.clone())
            .filter(|u| query.map_or(true, |q| u.name.to_lowercase().contains(&q.to_lowercase())))
            .collect();
        Ok(page_of(&users, page))
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.user.id != id);
        if rows.len() == before {
            return Err(DomainError::NotFound("User"));
        }
        Ok(())
    }
}

pub struct InMemorySessions {
    pub users: Arc<InMemoryUsers>,
    pub rows: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl InMemorySessions {
    pub fn new(users: Arc<InMemoryUsers>) -> Self {
        Self {
            users,
            rows: Mutex::new(HashMap::new()),
        }
    }
}

impl SessionRepository for InMemorySessions {
    fn create(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.rows
            .lock()
            .unwrap()
            .insert(token_hash.to_string(), (user_id, expires_at));
        Ok(())
    }

    fn find_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>, DomainError> {
        let session = self.rows.lock().unwrap().get(token_hash).copied();
        match session {
            Some((user_id, expires_at)) if expires_at > now => self.users.find_by_id(user_id),
            _ => Ok(None),
        }
    }

    fn delete(&self, token_hash: &str) -> Result<(), DomainError> {
        self.rows.lock().unwrap().remove(token_hash);
        Ok(())
    }
}

// ── orders ───────────────────────────────────────────────────────────────────

pub struct InMemoryOrders {
    pub products: Arc<InMemoryProducts>,
    pub carts: Arc<InMemoryCarts>,
    pub users: Arc<InMemoryUsers>,
    pub rows: Mutex<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn new(
        products: Arc<InMemoryProducts>,
        carts: Arc<InMemoryCarts>,
        users: Arc<InMemoryUsers>,
    ) -> Self {
        Self {
            products,
            carts,
            users,
            rows: Mutex::new(Vec::new()),
        }
    }

    fn modify(&self, id: Uuid, change: impl FnOnce(&mut Order)) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let order = rows
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound("Order"))?;
        change(order);
        Ok(())
    }
}

impl OrderRepository for InMemoryOrders {
    fn create_from_cart(&self, order: NewOrder) -> Result<Option<Uuid>, DomainError> {
        let customer = self
            .users
            .find_by_id(order.user_id)?
            .ok_or(DomainError::NotFound("User"))?;
        let (items, prices) = {
            let mut carts = self.carts.rows.lock().unwrap();
            let cart = carts
                .iter_mut()
                .find(|c| c.id == order.cart_id)
                .ok_or(DomainError::NotFound("Cart"))?;
            if cart.items.is_empty() {
                return Ok(None);
            }
            let snapshot = (std::mem::take(&mut cart.items), cart.prices.clone());
            cart.prices = CartPrices::zero();
            snapshot
        };

        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(Order {
            id,
            user_id: order.user_id,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_result: None,
            prices,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
            items,
            user: OrderCustomer {
                name: customer.name,
                email: customer.email,
            },
        });
        Ok(Some(id))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<ListResult<Order>, DomainError> {
        let mine: Vec<Order> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(&mine, page))
    }

    fn list_all(
        &self,
        customer_query: Option<&str>,
        page: PageRequest,
    ) -> Result<ListResult<Order>, DomainError> {
        let all: Vec<Order> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|o| {
                customer_query
                    .map_or(true, |q| o.user.name.to_lowercase().contains(&q.to_lowercase()))
            })
            .cloned()
            .collect();
        Ok(page_of(&all, page))
    }

    fn set_payment_result(&self, id: Uuid, result: &PaymentResult) -> Result<(), DomainError> {
        self.modify(id, |o| o.payment_result = Some(result.clone()))
    }

    fn mark_paid(&self, id: Uuid, result: Option<PaymentResult>) -> Result<(), DomainError> {
        let order = self.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))?;
        if order.is_paid {
            return Err(DomainError::Conflict("Order already paid".to_string()));
        }
        {
            let mut products = self.products.rows.lock().unwrap();
            for item in &order.items {
                if let Some(p) = products.iter_mut().find(|p| p.id == item.product_id) {
                    p.stock -= item.qty;
                }
            }
        }
        self.modify(id, |o| {
            o.is_paid = true;
            o.paid_at = Some(Utc::now());
            if result.is_some() {
                o.payment_result = result;
            }
        })
    }

    fn mark_delivered(&self, id: Uuid) -> Result<(), DomainError> {
        let order = self.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))?;
        if !order.is_paid {
            return Err(DomainError::InvalidInput("Order is not paid".to_string()));
        }
        self.modify(id, |o| {
            o.is_delivered = true;
            o.delivered_at = Some(Utc::now());
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|o| o.id != id);
        if rows.len() == before {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }

    fn has_paid_purchase(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.rows.lock().unwrap().iter().any(|o| {
            o.user_id == user_id && o.is_paid && o.items.iter().any(|i| i.product_id == product_id)
        }))
    }

    fn summary(&self) -> Result<OrderSummary, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(OrderSummary {
            orders_count: rows.len() as i64,
            products_count: self.products.rows.lock().unwrap().len() as i64,
            users_count: self.users.rows.lock().unwrap().len() as i64,
            total_sales: rows
                .iter()
                .fold(BigDecimal::from(0), |acc, o| acc + &o.prices.total_price),
            sales_data: Vec::new(),
            latest_sales: Vec::new(),
        })
    }
}

// ── reviews ──────────────────────────────────────────────────────────────────

pub struct InMemoryReviews {
    pub products: Arc<InMemoryProducts>,
    pub users: Arc<InMemoryUsers>,
    pub rows: Mutex<Vec<Review>>,
}

impl InMemoryReviews {
    pub fn new(products: Arc<InMemoryProducts>, users: Arc<InMemoryUsers>) -> Self {
        Self {
            products,
            users,
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl ReviewRepository for InMemoryReviews {
    fn upsert(&self, user_id: Uuid, input: &ReviewInput, verified: bool) -> Result<Review, DomainError> {
        if self.products.find_by_id(input.product_id)?.is_none() {
            return Err(DomainError::NotFound("Product"));
        }
        let user_name = self
            .users
            .find_by_id(user_id)?
            .ok_or(DomainError::NotFound("User"))?
            .name;

        let mut rows = self.rows.lock().unwrap();
        let review = Review {
            id: rows
                .iter()
                .find(|r| r.user_id == user_id && r.product_id == input.product_id)
                .map_or_else(Uuid::new_v4, |r| r.id),
            user_id,
            product_id: input.product_id,
            rating: input.rating,
            title: input.title.clone(),
            description: input.description.clone(),
            is_verified_purchase: verified,
            created_at: Utc::now(),
            user_name,
        };
        rows.retain(|r| r.id != review.id);
        rows.push(review.clone());

        let ratings: Vec<i32> = rows
            .iter()
            .filter(|r| r.product_id == input.product_id)
            .map(|r| r.rating)
            .collect();
        let sum: i32 = ratings.iter().sum();
        if let Some(product) = self
            .products
            .rows
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == input.product_id)
        {
            product.num_reviews = ratings.len() as i32;
            product.rating = money(BigDecimal::from(sum) / BigDecimal::from(ratings.len() as i32));
        }
        Ok(review)
    }

    fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    fn find_for_user(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.product_id == product_id)
            .cloned())
    }
}

// ── payment providers ────────────────────────────────────────────────────────

/// Hands out a fixed PayPal order id and replays a configured capture.
pub struct FakePaypal {
    pub order_id: String,
    pub capture: Mutex<Option<PaypalCapture>>,
}

#[async_trait]
impl PaypalGateway for FakePaypal {
    async fn create_order(&self, _amount: &BigDecimal) -> Result<String, DomainError> {
        Ok(self.order_id.clone())
    }

    async fn capture_payment(&self, _paypal_order_id: &str) -> Result<PaypalCapture, DomainError> {
        self.capture
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DomainError::Payment("capture refused".to_string()))
    }
}

/// Records the intents it was asked to create; accepts webhooks signed `"valid"`.
#[derive(Default)]
pub struct FakeStripe {
    pub intents: Mutex<Vec<(i64, Uuid)>>,
    pub event: Mutex<Option<StripeWebhookEvent>>,
}

#[async_trait]
impl StripeGateway for FakeStripe {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        order_id: Uuid,
    ) -> Result<String, DomainError> {
        self.intents.lock().unwrap().push((amount_cents, order_id));
        Ok(format!("pi_secret_{order_id}"))
    }

    fn parse_webhook(
        &self,
        _payload: &[u8],
        signature: &str,
        _now: i64,
    ) -> Result<StripeWebhookEvent, DomainError> {
        if signature != "valid" {
            return Err(DomainError::InvalidInput("Invalid Stripe signature".to_string()));
        }
        self.event
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DomainError::InvalidInput("no event".to_string()))
    }
}

/// Every in-memory repository, wired together the way the diesel ones share a database.
pub struct Store {
    pub products: Arc<InMemoryProducts>,
    pub carts: Arc<InMemoryCarts>,
    pub users: Arc<InMemoryUsers>,
    pub sessions: Arc<InMemorySessions>,
    pub orders: Arc<InMemoryOrders>,
    pub reviews: Arc<InMemoryReviews>,
}

impl Store {
    pub fn new() -> Self {
        let products = Arc::new(InMemoryProducts::default());
        let carts = Arc::new(InMemoryCarts::default());
        let users = Arc::new(InMemoryUsers::default());
        Self {
            sessions: Arc::new(InMemorySessions::new(users.clone())),
            orders: Arc::new(InMemoryOrders::new(
                products.clone(),
                carts.clone(),
                users.clone(),
            )),
            reviews: Arc::new(InMemoryReviews::new(products.clone(), users.clone())),
            products,
            carts,
            users,
        }
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Jane Doe".to_string(),
        street_address: "1 Main St".to_string(),
        city: "Anytown".to_string(),
        postal_code: "12345".to_string(),
        country: "USA".to_string(),
        lat: None,
        lng: None,
    }
}
