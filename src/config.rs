use std::env;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use governor::Quota;
use log::warn;

pub const DEFAULT_QUAKELIST_URL: &str = "https://quakelist.net/api/full";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,

    // Upstream credentials and endpoints
    pub steam_api_key: Option<String>,
    pub ipinfo_api_key: Option<String>,
    pub quakelist_url: String,
    pub steam_server_limit: u32,
    pub upstream_timeout_secs: u64,

    // News content
    pub news_dir: PathBuf,

    // Rate limiting per client IP
    pub api_period_secs: u64,
    pub api_burst_limit: u32,
    /// Peers whose `X-Forwarded-For` header is believed.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            steam_api_key: None,
            ipinfo_api_key: None,
            quakelist_url: DEFAULT_QUAKELIST_URL.to_string(),
            steam_server_limit: 10,
            upstream_timeout_secs: 10,
            news_dir: PathBuf::from("content/news"),
            api_period_secs: 1,
            api_burst_limit: 30,
            trusted_proxies: Vec::new(),
        }
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Comma separated IPs. Entries that do not parse are logged and skipped.
fn ip_list(key: &str) -> Vec<IpAddr> {
    let Ok(value) = env::var(key) else {
        return Vec::new();
    };
    parse_ip_list(&value)
}

fn parse_ip_list(value: &str) -> Vec<IpAddr> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                warn!("Ignoring invalid trusted proxy address {}", entry);
                None
            }
        })
        .collect()
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: non_empty("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parsed("PORT", defaults.port),

            steam_api_key: non_empty("STEAM_API_KEY"),
            ipinfo_api_key: non_empty("IPINFO_API_KEY"),
            quakelist_url: non_empty("QUAKELIST_URL").unwrap_or(defaults.quakelist_url),
            steam_server_limit: parsed("STEAM_SERVER_LIMIT", defaults.steam_server_limit),
            upstream_timeout_secs: parsed("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs),

            news_dir: non_empty("NEWS_DIR").map(PathBuf::from).unwrap_or(defaults.news_dir),

            api_period_secs: parsed("API_PERIOD_SECS", defaults.api_period_secs),
            api_burst_limit: parsed("API_BURST_LIMIT", defaults.api_burst_limit),
            trusted_proxies: ip_list("TRUSTED_PROXIES"),
        }
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }

    /// Per-client quota shared by the proxy routes and the list pages. A zero period or burst
    /// falls back to one request per second.
    pub fn api_quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.api_burst_limit).unwrap_or(NonZeroU32::MIN);
        Quota::with_period(Duration::from_secs(self.api_period_secs))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst)
    }
}
