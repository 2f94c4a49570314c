//! Roster presentation for a single server and the connect deep-link.

use crate::models::server::{Player, Server};

pub const CONNECT_SCHEME: &str = "steam://connect/";

/// Quake color set selected by `^0`..`^7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameColor {
    /// Text before the first token inherits the surrounding color.
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
    Magenta,
    White,
}

impl NameColor {
    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            '0' => NameColor::Black,
            '1' => NameColor::Red,
            '2' => NameColor::Green,
            '3' => NameColor::Yellow,
            '4' => NameColor::Blue,
            '5' => NameColor::Cyan,
            '6' => NameColor::Magenta,
            '7' => NameColor::White,
            _ => return None,
        })
    }

    pub fn css(self) -> Option<&'static str> {
        match self {
            NameColor::Default => None,
            NameColor::Black => Some("#000000"),
            NameColor::Red => Some("#ff0000"),
            NameColor::Green => Some("#00ff00"),
            NameColor::Yellow => Some("#ffff00"),
            NameColor::Blue => Some("#0000ff"),
            NameColor::Cyan => Some("#00ffff"),
            NameColor::Magenta => Some("#ff00ff"),
            NameColor::White => Some("#ffffff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSegment {
    pub text: String,
    pub color: NameColor,
}

/// Splits a raw name on `^N` tokens. Tokens are consumed; a `^` that is not
/// followed by a digit 0-7 is kept as literal text.
pub fn segment_name(raw: &str) -> Vec<NameSegment> {
    let mut segments = Vec::new();
    let mut color = NameColor::Default;
    let mut text = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '^' {
            if let Some(next) = chars.peek().copied().and_then(NameColor::from_code) {
                chars.next();
                if !text.is_empty() {
                    segments.push(NameSegment {
                        text: std::mem::take(&mut text),
                        color,
                    });
                }
                color = next;
                continue;
            }
        }
        text.push(c);
    }
    if !text.is_empty() {
        segments.push(NameSegment { text, color });
    }
    segments
}

/// The name with all color tokens removed.
pub fn strip_colors(raw: &str) -> String {
    segment_name(raw).into_iter().map(|s| s.text).collect()
}

pub fn score_label(player: &Player) -> String {
    if player.is_spectator() {
        "Spectator".to_string()
    } else {
        format!("Score: {}", player.score)
    }
}

/// `steam://connect/<address>`. The address is passed through as sent by
/// the upstream list; only an empty address is refused.
pub fn connect_uri(address: &str) -> Option<String> {
    if address.trim().is_empty() {
        None
    } else {
        Some(format!("{}{}", CONNECT_SCHEME, address))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub segments: Vec<NameSegment>,
    pub label: String,
    pub spectator: bool,
    pub duration: i64,
}

/// Everything the detail view shows for one server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDetail {
    pub address: String,
    pub name: Vec<NameSegment>,
    pub map_name: String,
    pub game_mode: String,
    pub human_count: u32,
    pub max_players: u32,
    pub spectator_count: usize,
    pub players: Vec<PlayerRow>,
    pub connect_uri: Option<String>,
}

impl ServerDetail {
    pub fn from_server(server: &Server) -> Self {
        let players = server
            .players
            .iter()
            .map(|player| PlayerRow {
                segments: segment_name(&player.raw_name),
                label: score_label(player),
                spectator: player.is_spectator(),
                duration: player.duration,
            })
            .collect();

        Self {
            address: server.address.clone(),
            name: segment_name(&server.name),
            map_name: server.map_name.clone(),
            game_mode: server.game_mode.clone(),
            human_count: server.human_count,
            max_players: server.max_players,
            spectator_count: server.spectator_count(),
            players,
            connect_uri: connect_uri(&server.address),
        }
    }
}
