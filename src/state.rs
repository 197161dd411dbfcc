use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::cart_service::CartService;
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::order_service::OrderService;
use crate::application::payment_service::PaymentService;
use crate::application::review_service::ReviewService;
use crate::config::Settings;
use crate::db::DbPool;
use crate::domain::ports::{PaypalGateway, StripeGateway};
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::paypal::PaypalClient;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::review_repo::DieselReviewRepository;
use crate::infrastructure::stripe::StripeClient;
use crate::infrastructure::user_repo::{DieselSessionRepository, DieselUserRepository};

/// Services shared by every worker.
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: Arc<CartService>,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub reviews: ReviewService,
    pub auth: AuthService,
    pub default_payment_method: String,
    pub session_max_age_days: i64,
}

impl AppState {
    /// Wire the diesel repositories and payment clients behind the services.
    pub fn new(pool: DbPool, settings: &Settings) -> Self {
        let products = Arc::new(DieselProductRepository::new(pool.clone()));
        let carts = Arc::new(DieselCartRepository::new(pool.clone()));
        let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
        let users = Arc::new(DieselUserRepository::new(pool.clone()));
        let sessions = Arc::new(DieselSessionRepository::new(pool.clone()));
        let reviews = Arc::new(DieselReviewRepository::new(pool));

        let paypal = settings
            .paypal
            .clone()
            .map(|s| Arc::new(PaypalClient::new(s)) as Arc<dyn PaypalGateway>);
        let stripe = settings
            .stripe
            .clone()
            .map(|s| Arc::new(StripeClient::new(s)) as Arc<dyn StripeGateway>);

        let cart_service = Arc::new(CartService::new(carts.clone(), products.clone()));

        Self {
            catalog: CatalogService::new(
                products,
                settings.latest_products_limit,
                settings.page_size,
            ),
            checkout: CheckoutService::new(
                users.clone(),
                carts,
                orders.clone(),
                settings.payment_methods.clone(),
            ),
            orders: OrderService::new(orders.clone()),
            payments: PaymentService::new(orders.clone(), paypal, stripe),
            reviews: ReviewService::new(reviews, orders),
            auth: AuthService::new(
                users,
                sessions,
                cart_service.clone(),
                settings.session_max_age_days,
                bcrypt::DEFAULT_COST,
            ),
            carts: cart_service,
            default_payment_method: settings.default_payment_method.clone(),
            session_max_age_days: settings.session_max_age_days,
        }
    }
}
