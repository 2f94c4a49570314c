// src/models/server.rs
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Upstream payloads are loosely typed: numbers arrive as strings, strings
/// as numbers, and any field may be null. Each of these helpers maps the
/// unexpected shape to the field's default instead of rejecting the record.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_int(deserializer)?;
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

/// Nested records: anything but an object becomes the default.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// Roster entries that are not objects are dropped; the rest of the roster
/// and the server survive.
fn lenient_players<'de, D>(deserializer: D) -> Result<Vec<Player>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_visibility<'de, D>(deserializer: D) -> Result<Visibility, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Visibility::from(Some(s)),
        _ => Visibility::Public,
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    /// Name as sent by the game server, including `^N` color tokens.
    #[serde(rename = "name", deserialize_with = "lenient_string")]
    pub raw_name: String,
    #[serde(rename = "plain-name", deserialize_with = "lenient_string")]
    pub plain_name: String,
    #[serde(deserialize_with = "lenient_int")]
    pub score: i64,
    /// Seconds connected.
    #[serde(deserialize_with = "lenient_int")]
    pub duration: i64,
}

impl Player {
    /// Quake Live reports spectators with a score of exactly zero.
    pub fn is_spectator(&self) -> bool {
        self.score == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub continent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Other(String),
}

impl From<Option<String>> for Visibility {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Visibility::Public,
            Some(s) if s.eq_ignore_ascii_case("public") => Visibility::Public,
            Some(s) if s.eq_ignore_ascii_case("private") => Visibility::Private,
            Some(s) => Visibility::Other(s),
        }
    }
}

impl From<Visibility> for String {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::Public => "public".to_string(),
            Visibility::Private => "private".to_string(),
            Visibility::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// `ip:port`, unique within one fetch.
    #[serde(rename = "addr", deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "mapname", deserialize_with = "lenient_string")]
    pub map_name: String,
    #[serde(rename = "humans", deserialize_with = "lenient_count")]
    pub human_count: u32,
    #[serde(rename = "maxplayers", deserialize_with = "lenient_count")]
    pub max_players: u32,
    #[serde(rename = "game", deserialize_with = "lenient_string")]
    pub game_mode: String,
    #[serde(deserialize_with = "lenient_object")]
    pub country: Country,
    #[serde(deserialize_with = "lenient_visibility")]
    pub visibility: Visibility,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_players")]
    pub players: Vec<Player>,
}

impl Server {
    pub fn is_full(&self) -> bool {
        self.human_count >= self.max_players
    }

    pub fn is_empty(&self) -> bool {
        self.human_count == 0
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Derived from the roster; the upstream `spectators` field is ignored
    /// so the count always agrees with the per-player labels.
    pub fn spectator_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_spectator()).count()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_wire_names() {
        let server: Server = serde_json::from_value(json!({
            "addr": "1.2.3.4:27960",
            "name": "^1Red ^7Server",
            "mapname": "campgrounds",
            "humans": 4,
            "maxplayers": 16,
            "game": "Clan Arena",
            "country": { "code": "DE", "name": "Germany", "continent": "EU" },
            "visibility": "private",
            "tags": ["ca", "minqlx"],
            "players": [
                { "name": "^2bob", "plain-name": "bob", "score": 0, "duration": 30 },
                { "name": "alice", "plain-name": "alice", "score": 12, "duration": 300 }
            ],
            "spectators": 7
        }))
        .unwrap();

        assert_eq!(server.address, "1.2.3.4:27960");
        assert_eq!(server.map_name, "campgrounds");
        assert_eq!(server.human_count, 4);
        assert_eq!(server.max_players, 16);
        assert_eq!(server.country.continent, "EU");
        assert!(server.is_private());
        assert_eq!(server.players[0].plain_name, "bob");
        // Upstream `spectators` is ignored in favour of the roster.
        assert_eq!(server.spectator_count(), 1);
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let server: Server = serde_json::from_value(json!({
            "addr": "5.6.7.8:27961",
            "humans": "3",
            "maxplayers": null,
            "country": null,
            "tags": null,
            "visibility": null
        }))
        .unwrap();

        assert_eq!(server.human_count, 3);
        assert_eq!(server.max_players, 0);
        assert_eq!(server.country, Country::default());
        assert!(server.tags.is_empty());
        assert!(server.players.is_empty());
        assert_eq!(server.visibility, Visibility::Public);
        assert!(server.is_full());
    }

    #[test]
    fn test_visibility_other_is_not_private() {
        let server: Server =
            serde_json::from_value(json!({ "visibility": "Friends" })).unwrap();
        assert_eq!(server.visibility, Visibility::Other("Friends".to_string()));
        assert!(!server.is_private());
    }

    #[test]
    fn test_negative_counts_clamp_to_zero() {
        let server: Server = serde_json::from_value(json!({ "humans": -2 })).unwrap();
        assert_eq!(server.human_count, 0);
        assert!(server.is_empty());
    }

    #[test]
    fn test_malformed_nested_fields_keep_the_server() {
        let server: Server = serde_json::from_value(json!({
            "addr": "a:1",
            "players": [{ "name": "alice", "score": 3 }, null, "bob", 7],
            "country": "SE",
            "visibility": 1
        }))
        .unwrap();
        assert_eq!(server.players.len(), 1);
        assert_eq!(server.players[0].raw_name, "alice");
        assert_eq!(server.country, Country::default());
        assert_eq!(server.visibility, Visibility::Public);

        let server: Server =
            serde_json::from_value(json!({ "addr": "c:3", "players": {} })).unwrap();
        assert!(server.players.is_empty());
    }
}
