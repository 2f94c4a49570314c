// src/handlers/mod.rs
pub mod news;
pub mod pages;
pub mod servers;

use actix_web::web;

use crate::browser::fetch::HttpServerSource;
use crate::config::Config;
use crate::storage::memory::GeoCache;

const USER_AGENT: &str = concat!("qlbrowser/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client and upstream settings for all handlers.
pub struct Upstream {
    pub client: reqwest::Client,
    pub config: Config,
    pub geo_cache: GeoCache,
    pub aggregator: HttpServerSource,
}

impl Upstream {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        let aggregator = HttpServerSource::new(client.clone(), config.quakelist_url.clone());
        Ok(Self {
            client,
            config,
            geo_cache: GeoCache::new(),
            aggregator,
        })
    }
}

/// Every route of the site. Expects `Upstream`, `NewsStore` and
/// `ClientRateLimiter` in app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::index))
        .route("/server/{address}", web::get().to(pages::server_detail))
        .route("/connect/{address}", web::get().to(pages::connect))
        .route("/news", web::get().to(pages::news_index))
        .route("/news/{id}", web::get().to(pages::news_post))
        .route("/api/quakelist", web::get().to(servers::get_quakelist))
        .route("/api/quake-live-servers", web::get().to(servers::get_steam_servers))
        .route("/api/content/news", web::get().to(news::get_news));
}
