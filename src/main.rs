use std::io;

use actix_web::web;
use dotenvy::dotenv;
use storefront::{build_server, create_pool, run_migrations, AppState, Settings};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(io::Error::other)?;
    let pool = create_pool(&settings.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    if settings.paypal.is_none() {
        log::warn!("PayPal credentials not set; PayPal payments are disabled");
    }
    if settings.stripe.is_none() {
        log::warn!("Stripe credentials not set; Stripe payments are disabled");
    }

    let state = web::Data::new(AppState::new(pool, &settings));

    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(state, &settings.host, settings.port)?.await
}
