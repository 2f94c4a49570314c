// src/utils.rs
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use log::{debug, warn};
use serde_json::{json, Value};
use std::net::IpAddr;

use crate::news::ContentError;

pub type ClientRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to extract client IP")]
    MissingPeerIP,
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("Steam API key is not set in environment variables")]
    MissingApiKey,
    #[error("Failed to fetch servers")]
    AggregatorUnavailable(String),
    #[error("Failed to fetch server list from Steam API")]
    SteamStatus { status: u16, details: String },
    #[error("Unexpected data structure")]
    UnexpectedStructure(Value),
    #[error("Failed to fetch servers")]
    SteamUnavailable(String),
    #[error("Post not found")]
    PostNotFound,
    #[error("Failed to read posts")]
    Content(String),
}

impl GatewayError {
    fn details(&self) -> Option<Value> {
        match self {
            Self::AggregatorUnavailable(details)
            | Self::SteamUnavailable(details)
            | Self::Content(details) => Some(Value::String(details.clone())),
            Self::SteamStatus { details, .. } => Some(Value::String(details.clone())),
            Self::UnexpectedStructure(body) => Some(body.clone()),
            _ => None,
        }
    }
}

impl From<ContentError> for GatewayError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::NotFound(_) => Self::PostNotFound,
            ContentError::Io(e) => Self::Content(e.to_string()),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingPeerIP => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::PostNotFound => StatusCode::NOT_FOUND,
            Self::SteamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self.details() {
            Some(details) => json!({ "error": self.to_string(), "details": details }),
            None => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// The connection's peer address. When the peer is one of `trusted_proxies`
/// the first `X-Forwarded-For` entry is used instead.
pub fn client_ip(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> Result<IpAddr, GatewayError> {
    let peer = req
        .peer_addr()
        .map(|addr| addr.ip())
        .ok_or(GatewayError::MissingPeerIP)?;
    if !trusted_proxies.contains(&peer) {
        return Ok(peer);
    }

    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(Ok(ip)) = ip_str.split(',').next().map(|s| s.trim().parse::<IpAddr>()) {
                debug!("Using X-Forwarded-For client IP {} from proxy {}", ip, peer);
                return Ok(ip);
            }
        }
    }
    Ok(peer)
}

pub fn check_rate_limit(
    req: &HttpRequest,
    rate_limiter: &ClientRateLimiter,
    trusted_proxies: &[IpAddr],
) -> Result<IpAddr, GatewayError> {
    let ip = client_ip(req, trusted_proxies)?;
    if rate_limiter.check_key(&ip).is_err() {
        warn!("Rate limit exceeded for {} on {}", ip, req.path());
        return Err(GatewayError::RateLimitExceeded);
    }
    Ok(ip)
}
