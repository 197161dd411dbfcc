use utoipa::OpenApi;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::order::{
    LatestSale, MonthlySales, Order, OrderCustomer, OrderSummary, PaymentResult,
};
use crate::domain::pricing::CartPrices;
use crate::domain::product::{CategoryCount, Product};
use crate::domain::review::Review;
use crate::domain::user::{Role, ShippingAddress, User};
use crate::handlers::{self, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront API", description = "Catalog, cart, checkout, payments and back office"),
    paths(
        handlers::products::latest,
        handlers::products::featured,
        handlers::products::categories,
        handlers::products::search,
        handlers::products::by_slug,
        handlers::reviews::list_for_product,
        handlers::reviews::upsert,
        handlers::reviews::mine,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::remove_item,
        handlers::auth::sign_up,
        handlers::auth::sign_in,
        handlers::auth::sign_out,
        handlers::me::profile,
        handlers::me::update_profile,
        handlers::me::update_address,
        handlers::me::update_payment_method,
        handlers::me::my_orders,
        handlers::orders::place_order,
        handlers::orders::get_order,
        handlers::orders::create_paypal_order,
        handlers::orders::approve_paypal_order,
        handlers::orders::create_stripe_intent,
        handlers::payments::stripe_webhook,
        handlers::admin::summary,
        handlers::admin::list_products,
        handlers::admin::get_product,
        handlers::admin::create_product,
        handlers::admin::update_product,
        handlers::admin::delete_product,
        handlers::admin::list_orders,
        handlers::admin::delete_order,
        handlers::admin::mark_paid,
        handlers::admin::mark_delivered,
        handlers::admin::list_users,
        handlers::admin::get_user,
        handlers::admin::update_user,
        handlers::admin::delete_user,
    ),
    components(schemas(
        Product,
        CategoryCount,
        Cart,
        CartItem,
        CartPrices,
        Order,
        OrderCustomer,
        OrderSummary,
        MonthlySales,
        LatestSale,
        PaymentResult,
        Review,
        User,
        Role,
        ShippingAddress,
        MessageResponse,
    )),
    tags(
        (name = "products", description = "Catalog browsing"),
        (name = "reviews", description = "Product reviews"),
        (name = "cart", description = "Session and user carts"),
        (name = "auth", description = "Sign up, sign in and sessions"),
        (name = "me", description = "The signed-in user's profile and orders"),
        (name = "orders", description = "Order placement and lookup"),
        (name = "payments", description = "PayPal and Stripe"),
        (name = "admin", description = "Back office"),
    )
)]
pub struct ApiDoc;
