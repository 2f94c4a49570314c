// src/handlers/servers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::future::join_all;
use log::{debug, error, warn};
use serde_json::Value;
use std::net::IpAddr;

use crate::handlers::Upstream;
use crate::utils::{check_rate_limit, ClientRateLimiter, GatewayError};

pub const STEAM_SERVER_LIST_URL: &str =
    "https://api.steampowered.com/IGameServersService/GetServerList/v1/";
pub const IPINFO_URL: &str = "https://ipinfo.io";
/// Steam application id of Quake Live.
pub const QUAKE_LIVE_APP_ID: u32 = 282440;
pub const UNKNOWN_COUNTRY: &str = "unknown";

/// Aggregator list, forwarded unchanged.
pub async fn get_quakelist(
    req: HttpRequest,
    upstream: web::Data<Upstream>,
    rate_limiter: web::Data<ClientRateLimiter>,
) -> Result<HttpResponse, GatewayError> {
    check_rate_limit(&req, &rate_limiter, &upstream.config.trusted_proxies)?;

    let url = &upstream.config.quakelist_url;
    let response = upstream.client.get(url).send().await.map_err(|e| {
        error!("Error fetching Quake Live servers from {}: {}", url, e);
        GatewayError::AggregatorUnavailable(e.to_string())
    })?;
    let data = response.json::<Value>().await.map_err(|e| {
        error!("Error parsing Quake Live servers from {}: {}", url, e);
        GatewayError::AggregatorUnavailable(e.to_string())
    })?;

    Ok(HttpResponse::Ok().json(data))
}

/// Steam master list for Quake Live, each entry tagged with `countryCode`.
pub async fn get_steam_servers(
    req: HttpRequest,
    upstream: web::Data<Upstream>,
    rate_limiter: web::Data<ClientRateLimiter>,
) -> Result<HttpResponse, GatewayError> {
    check_rate_limit(&req, &rate_limiter, &upstream.config.trusted_proxies)?;

    let api_key = upstream
        .config
        .steam_api_key
        .as_deref()
        .ok_or(GatewayError::MissingApiKey)?;

    let filter = format!("appid\\{}", QUAKE_LIVE_APP_ID);
    let limit = upstream.config.steam_server_limit.to_string();
    let response = upstream
        .client
        .get(STEAM_SERVER_LIST_URL)
        .query(&[("key", api_key), ("filter", filter.as_str()), ("limit", limit.as_str())])
        .send()
        .await
        .map_err(|e| {
            error!("Error fetching server list from Steam: {}", e);
            GatewayError::SteamUnavailable(e.to_string())
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        error!("Error reading Steam response body: {}", e);
        GatewayError::SteamUnavailable(e.to_string())
    })?;
    debug!("Steam responded {} with {} bytes", status, body.len());

    if !status.is_success() {
        return Err(GatewayError::SteamStatus {
            status: status.as_u16(),
            details: body,
        });
    }

    let data: Value = serde_json::from_str(&body).map_err(|e| {
        error!("Steam returned invalid JSON: {}", e);
        GatewayError::SteamUnavailable(e.to_string())
    })?;
    let servers = extract_steam_servers(data)?;

    let enriched = join_all(servers.into_iter().map(|server| with_country_code(&upstream, server))).await;
    Ok(HttpResponse::Ok().json(enriched))
}

fn extract_steam_servers(data: Value) -> Result<Vec<Value>, GatewayError> {
    match data.pointer("/response/servers") {
        Some(Value::Array(servers)) => Ok(servers.clone()),
        _ => {
            warn!("Unexpected Steam response structure");
            Err(GatewayError::UnexpectedStructure(data))
        }
    }
}

/// Host part of `ip:port`.
fn host_of(addr: &str) -> &str {
    addr.split(':').next().unwrap_or(addr)
}

async fn with_country_code(upstream: &Upstream, mut server: Value) -> Value {
    let host = server
        .get("addr")
        .and_then(Value::as_str)
        .map(|addr| host_of(addr).to_string());

    let country = match host {
        Some(host) => lookup_country(upstream, &host).await,
        None => None,
    };

    if let Value::Object(fields) = &mut server {
        fields.insert(
            "countryCode".to_string(),
            Value::String(country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())),
        );
    }
    server
}

/// Lower-case country code for `host`, from the cache or ipinfo.io.
pub async fn lookup_country(upstream: &Upstream, host: &str) -> Option<String> {
    let ip: IpAddr = match host.parse() {
        Ok(ip) => ip,
        Err(_) => {
            debug!("Not resolving country for non-IP host {}", host);
            return None;
        }
    };
    if let Some(code) = upstream.geo_cache.get(&ip) {
        return Some(code);
    }

    let mut request = upstream.client.get(format!("{}/{}/json", IPINFO_URL, ip));
    if let Some(token) = upstream.config.ipinfo_api_key.as_deref() {
        request = request.query(&[("token", token)]);
    }

    let data = match request.send().await {
        Ok(response) => response.json::<Value>().await,
        Err(e) => Err(e),
    };
    let data = match data {
        Ok(data) => data,
        Err(e) => {
            error!("Error resolving IP {} to country code: {}", ip, e);
            return None;
        }
    };

    let code = data.get("country").and_then(Value::as_str)?.to_string();
    upstream.geo_cache.insert(ip, code);
    upstream.geo_cache.get(&ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::App;
    use serde_json::json;

    fn upstream(config: Config) -> web::Data<Upstream> {
        web::Data::new(Upstream::new(config).unwrap())
    }

    fn limiter(config: &Config) -> web::Data<ClientRateLimiter> {
        web::Data::new(ClientRateLimiter::keyed(config.api_quota()))
    }

    fn unreachable_config() -> Config {
        Config {
            quakelist_url: "http://127.0.0.1:9/api/full".to_string(),
            upstream_timeout_secs: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_extract_steam_servers() {
        let servers = extract_steam_servers(json!({
            "response": { "servers": [{ "addr": "1.2.3.4:27960" }] }
        }))
        .unwrap();
        assert_eq!(servers.len(), 1);

        let error = extract_steam_servers(json!({ "response": {} })).unwrap_err();
        assert!(matches!(error, GatewayError::UnexpectedStructure(_)));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("1.2.3.4:27960"), "1.2.3.4");
        assert_eq!(host_of("1.2.3.4"), "1.2.3.4");
    }

    #[actix_web::test]
    async fn test_cached_country_skips_lookup() {
        let upstream = Upstream::new(unreachable_config()).unwrap();
        upstream
            .geo_cache
            .insert("1.2.3.4".parse().unwrap(), "DE".to_string());

        let server = with_country_code(&upstream, json!({ "addr": "1.2.3.4:27960", "name": "x" })).await;
        assert_eq!(server["countryCode"], "de");
        assert_eq!(server["name"], "x");
    }

    #[actix_web::test]
    async fn test_unresolvable_host_is_unknown() {
        let upstream = Upstream::new(unreachable_config()).unwrap();
        let server = with_country_code(&upstream, json!({ "addr": "not-an-ip:27960" })).await;
        assert_eq!(server["countryCode"], UNKNOWN_COUNTRY);

        let server = with_country_code(&upstream, json!({ "name": "no address" })).await;
        assert_eq!(server["countryCode"], UNKNOWN_COUNTRY);
    }

    #[actix_web::test]
    async fn test_steam_without_key_is_500() {
        let config = unreachable_config();
        let app = init_service(
            App::new()
                .app_data(limiter(&config))
                .app_data(upstream(config))
                .route("/api/quake-live-servers", web::get().to(get_steam_servers)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/api/quake-live-servers")
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "Steam API key is not set in environment variables");
    }

    #[actix_web::test]
    async fn test_quakelist_unreachable_is_500() {
        let config = unreachable_config();
        let app = init_service(
            App::new()
                .app_data(limiter(&config))
                .app_data(upstream(config))
                .route("/api/quakelist", web::get().to(get_quakelist)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/api/quakelist")
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to fetch servers");
    }

    #[actix_web::test]
    async fn test_rate_limited_is_429() {
        let config = Config {
            api_period_secs: 60,
            api_burst_limit: 1,
            ..unreachable_config()
        };
        let app = init_service(
            App::new()
                .app_data(limiter(&config))
                .app_data(upstream(config))
                .route("/api/quake-live-servers", web::get().to(get_steam_servers)),
        )
        .await;

        // A client rotating X-Forwarded-For is still limited by its peer address.
        let request = |forwarded_for: &str| {
            TestRequest::get()
                .uri("/api/quake-live-servers")
                .insert_header(("X-Forwarded-For", forwarded_for))
                .peer_addr("127.0.0.1:5000".parse().unwrap())
                .to_request()
        };
        let first = call_service(&app, request("203.0.113.1")).await;
        assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let second = call_service(&app, request("203.0.113.2")).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
