pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Settings;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Register every storefront route. Static segments come before `/{slug}`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{admin, auth, cart, me, orders, payments, products, reviews};

    cfg.service(
        web::scope("/products")
            .route("", web::get().to(products::search))
            .route("/latest", web::get().to(products::latest))
            .route("/featured", web::get().to(products::featured))
            .route("/categories", web::get().to(products::categories))
            .route("/{id}/reviews", web::get().to(reviews::list_for_product))
            .route("/{id}/reviews", web::post().to(reviews::upsert))
            .route("/{id}/reviews/mine", web::get().to(reviews::mine))
            .route("/{slug}", web::get().to(products::by_slug)),
    )
    .service(
        web::scope("/cart")
            .route("", web::get().to(cart::get_cart))
            .route("/items", web::post().to(cart::add_item))
            .route("/items/{product_id}", web::delete().to(cart::remove_item)),
    )
    .service(
        web::scope("/auth")
            .route("/sign-up", web::post().to(auth::sign_up))
            .route("/sign-in", web::post().to(auth::sign_in))
            .route("/sign-out", web::post().to(auth::sign_out)),
    )
    .service(
        web::scope("/me")
            .route("", web::get().to(me::profile))
            .route("/profile", web::put().to(me::update_profile))
            .route("/address", web::put().to(me::update_address))
            .route("/payment-method", web::put().to(me::update_payment_method))
            .route("/orders", web::get().to(me::my_orders)),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::place_order))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/paypal", web::post().to(orders::create_paypal_order))
            .route(
                "/{id}/paypal/approve",
                web::post().to(orders::approve_paypal_order),
            )
            .route(
                "/{id}/stripe-intent",
                web::post().to(orders::create_stripe_intent),
            ),
    )
    .route("/webhooks/stripe", web::post().to(payments::stripe_webhook))
    .service(
        web::scope("/admin")
            .route("/summary", web::get().to(admin::summary))
            .route("/products", web::get().to(admin::list_products))
            .route("/products", web::post().to(admin::create_product))
            .route("/products/{id}", web::get().to(admin::get_product))
            .route("/products/{id}", web::put().to(admin::update_product))
            .route("/products/{id}", web::delete().to(admin::delete_product))
            .route("/orders", web::get().to(admin::list_orders))
            .route("/orders/{id}", web::delete().to(admin::delete_order))
            .route("/orders/{id}/pay", web::post().to(admin::mark_paid))
            .route("/orders/{id}/deliver", web::post().to(admin::mark_delivered))
            .route("/users", web::get().to(admin::list_users))
            .route("/users/{id}", web::get().to(admin::get_user))
            .route("/users/{id}", web::put().to(admin::update_user))
            .route("/users/{id}", web::delete().to(admin::delete_user)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let api_doc = openapi::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", api_doc.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
