// src/storage/memory.rs
use dashmap::DashMap;
use std::net::IpAddr;

/// Country codes resolved for server IPs. Only successful lookups are
/// stored; the geolocation service is asked again for anything missing.
#[derive(Debug, Default)]
pub struct GeoCache {
    countries: DashMap<IpAddr, String>,
}

impl GeoCache {
    pub fn new() -> Self {
        Self {
            countries: DashMap::new(),
        }
    }

    pub fn get(&self, ip: &IpAddr) -> Option<String> {
        self.countries.get(ip).map(|r| r.value().clone())
    }

    pub fn insert(&self, ip: IpAddr, country_code: String) {
        self.countries.insert(ip, country_code.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_lowercases() {
        let cache = GeoCache::new();
        let ip: IpAddr = "1.2.3.4".parse().unwrap();
        cache.insert(ip, "SE".to_string());
        assert_eq!(cache.get(&ip).as_deref(), Some("se"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss() {
        let cache = GeoCache::new();
        assert!(cache.get(&"8.8.8.8".parse().unwrap()).is_none());
        assert!(cache.is_empty());
    }
}
