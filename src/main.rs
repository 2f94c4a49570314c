// src/main.rs
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use qlbrowser::config::Config;
use qlbrowser::handlers::{self, Upstream};
use qlbrowser::news::NewsStore;
use qlbrowser::utils::ClientRateLimiter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env();
    if config.steam_api_key.is_none() {
        warn!("STEAM_API_KEY is not set, /api/quake-live-servers will answer 500");
    }

    let bind = config.bind();
    let rate_limiter = web::Data::new(ClientRateLimiter::keyed(config.api_quota()));
    let news = web::Data::new(NewsStore::new(config.news_dir.clone()));
    let upstream = Upstream::new(config).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to build HTTP client: {}", e),
        )
    })?;
    let upstream = web::Data::new(upstream);

    info!("Serving news from {}", news.dir().display());
    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(upstream.clone())
            .app_data(news.clone())
            .app_data(rate_limiter.clone())
            .configure(handlers::routes)
    })
        .bind(&bind)?
        .run().await
}
