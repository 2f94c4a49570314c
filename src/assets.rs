//! Static image lookups for country flags and map thumbnails.

use lazy_static::lazy_static;
use std::collections::HashMap;

pub const FLAG_PLACEHOLDER: &str = "/flags/unknown.png";
pub const MAP_PLACEHOLDER: &str = "/maps/default.jpg";

lazy_static! {
    /// Stock Quake Live maps that ship a thumbnail, with its file extension.
    static ref MAP_THUMBNAILS: HashMap<&'static str, &'static str> = {
        let mut maps = HashMap::new();
        for name in [
            "almostlost", "arkinholm", "asylum", "battleforged", "bitterembrace",
            "bloodrun", "brimstoneabbey", "campgrounds", "cannedheat", "concretepalace",
            "corrosion", "cure", "deepinside", "dismemberment", "doubleimpact",
            "elder", "eviscerated", "furiousheights", "hektik", "hiddenfortress",
            "houseofdecay", "innersanctums", "ironworks", "lostworld", "overkill",
            "purgatory", "quarantine", "sinister", "silence", "sorrow",
            "spillway", "stonekeep", "theatreofpain", "thunderstruck", "toxicity",
            "trinity", "verticalvengeance", "wargrounds", "windowpain",
        ] {
            maps.insert(name, "jpg");
        }
        for name in ["aerowalk", "focalpoint", "phrantic", "repent", "terminatria", "vortex"] {
            maps.insert(name, "webp");
        }
        maps
    };
}

/// `/flags/<code>.png` for a two-letter country code, otherwise the placeholder.
pub fn flag_url(code: &str) -> String {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return FLAG_PLACEHOLDER.to_string();
    }
    format!("/flags/{}.png", code.to_ascii_lowercase())
}

pub fn map_thumbnail_url(map_name: &str) -> String {
    let key = map_name.trim().to_ascii_lowercase();
    match MAP_THUMBNAILS.get(key.as_str()) {
        Some(ext) => format!("/maps/{}.{}", key, ext),
        None => MAP_PLACEHOLDER.to_string(),
    }
}
