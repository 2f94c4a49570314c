use std::collections::BTreeSet;

use crate::filter_panel::FilterEvent;
use crate::models::server::Server;

pub const ALL: &str = "all";

/// A single-select control value: either the wildcard or one concrete option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    /// Blank input and `all` (any case) select the wildcard.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Choice::All
        } else {
            Choice::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Choice::All => ALL,
            Choice::Only(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub continent: Choice,
    pub game_mode: Choice,
    pub show_full_servers: bool,
    pub show_empty_servers: bool,
    pub show_private_servers: bool,
    pub tags: BTreeSet<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            continent: Choice::All,
            game_mode: Choice::All,
            show_full_servers: true,
            show_empty_servers: true,
            show_private_servers: true,
            tags: BTreeSet::new(),
        }
    }
}

impl FilterCriteria {
    pub fn apply(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::GameMode(choice) => self.game_mode = choice,
            FilterEvent::Region(choice) => self.continent = choice,
            FilterEvent::ShowFull(show) => self.show_full_servers = show,
            FilterEvent::ShowEmpty(show) => self.show_empty_servers = show,
            FilterEvent::ShowPrivate(show) => self.show_private_servers = show,
            FilterEvent::Tags(tags) => self.tags = tags,
        }
    }

    /// True when every criterion accepts the server.
    pub fn matches(&self, server: &Server) -> bool {
        let continent = match &self.continent {
            Choice::All => true,
            Choice::Only(code) => server.country.continent == *code,
        };
        let game_mode = match &self.game_mode {
            Choice::All => true,
            Choice::Only(mode) => server.game_mode.to_lowercase() == mode.to_lowercase(),
        };

        continent
            && (self.show_full_servers || server.human_count < server.max_players)
            && (self.show_empty_servers || server.human_count != 0)
            && (self.show_private_servers || !server.is_private())
            && game_mode
            && self.tags.iter().all(|tag| server.has_tag(tag))
    }
}

/// The servers accepted by `criteria`, in their original order.
pub fn apply_filters<'a>(servers: &'a [Server], criteria: &FilterCriteria) -> Vec<&'a Server> {
    servers.iter().filter(|s| criteria.matches(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::{Country, Visibility};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn server(address: &str, continent: &str, humans: u32, max: u32) -> Server {
        Server {
            address: address.to_string(),
            human_count: humans,
            max_players: max,
            game_mode: "Clan Arena".to_string(),
            country: Country {
                code: "se".to_string(),
                name: "Sweden".to_string(),
                continent: continent.to_string(),
            },
            ..Server::default()
        }
    }

    fn tags(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_criteria_accept_everything() {
        let servers = vec![
            server("a", "EU", 0, 8),
            server("b", "NA", 8, 8),
            Server {
                visibility: Visibility::Private,
                ..server("c", "", 1, 4)
            },
        ];
        assert_eq!(apply_filters(&servers, &FilterCriteria::default()).len(), 3);
    }

    #[test]
    fn test_continent_filter() {
        let servers = vec![server("a", "EU", 1, 8), server("b", "NA", 1, 8)];
        let criteria = FilterCriteria {
            continent: Choice::Only("EU".to_string()),
            ..FilterCriteria::default()
        };
        let result = apply_filters(&servers, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].address, "a");
    }

    #[test]
    fn test_hide_full_treats_overflow_as_full() {
        let servers = vec![server("a", "EU", 8, 8), server("b", "EU", 9, 8), server("c", "EU", 7, 8)];
        let criteria = FilterCriteria {
            show_full_servers: false,
            ..FilterCriteria::default()
        };
        let result = apply_filters(&servers, &criteria);
        assert_eq!(result.iter().map(|s| s.address.as_str()).collect::<Vec<_>>(), ["c"]);
    }

    #[test]
    fn test_hide_empty_and_private() {
        let servers = vec![
            server("empty", "EU", 0, 8),
            Server {
                visibility: Visibility::Private,
                ..server("private", "EU", 2, 8)
            },
            Server {
                visibility: Visibility::Other("friends".to_string()),
                ..server("other", "EU", 2, 8)
            },
        ];
        let criteria = FilterCriteria {
            show_empty_servers: false,
            show_private_servers: false,
            ..FilterCriteria::default()
        };
        let result = apply_filters(&servers, &criteria);
        assert_eq!(result.iter().map(|s| s.address.as_str()).collect::<Vec<_>>(), ["other"]);
    }

    #[test]
    fn test_game_mode_case_insensitive() {
        let servers = vec![server("a", "EU", 1, 8)];
        let criteria = FilterCriteria {
            game_mode: Choice::Only("clan arena".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(apply_filters(&servers, &criteria).len(), 1);

        let criteria = FilterCriteria {
            game_mode: Choice::Only("Duel".to_string()),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(&servers, &criteria).is_empty());
    }

    #[test]
    fn test_tags_require_all() {
        let servers = vec![Server {
            tags: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..server("a", "EU", 1, 8)
        }];

        let mut criteria = FilterCriteria::default();
        criteria.apply(FilterEvent::Tags(tags(&["a", "b"])));
        assert_eq!(apply_filters(&servers, &criteria).len(), 1);

        criteria.apply(FilterEvent::Tags(tags(&["a", "d"])));
        assert!(apply_filters(&servers, &criteria).is_empty());
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(Choice::parse("ALL"), Choice::All);
        assert_eq!(Choice::parse("  "), Choice::All);
        assert_eq!(Choice::parse(" EU "), Choice::Only("EU".to_string()));
        assert_eq!(Choice::Only("EU".to_string()).as_str(), "EU");
    }

    #[test]
    fn test_order_preserved_and_source_untouched() {
        let servers: Vec<Server> = (0..10).map(|i| server(&i.to_string(), "EU", i % 3, 8)).collect();
        let before = servers.clone();
        let criteria = FilterCriteria {
            show_empty_servers: false,
            ..FilterCriteria::default()
        };
        let result = apply_filters(&servers, &criteria);
        let addresses: Vec<&str> = result.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(addresses, ["1", "2", "4", "5", "7", "8"]);
        assert_eq!(servers, before);
    }

    /// Randomized servers and criteria: inclusion must equal the conjunction
    /// of the six predicates evaluated independently.
    #[test]
    fn test_randomized_conjunction() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let continents = ["EU", "NA", "AS", "OC", ""];
        let modes = ["Clan Arena", "duel", "Free For All"];
        let tag_pool = ["a", "b", "c", "d"];

        for _ in 0..500 {
            let servers: Vec<Server> = (0..20)
                .map(|i| Server {
                    address: format!("10.0.0.{}:27960", i),
                    human_count: rng.gen_range(0..10),
                    max_players: rng.gen_range(0..10),
                    game_mode: modes[rng.gen_range(0..modes.len())].to_string(),
                    visibility: if rng.gen_bool(0.3) {
                        Visibility::Private
                    } else {
                        Visibility::Public
                    },
                    country: Country {
                        continent: continents[rng.gen_range(0..continents.len())].to_string(),
                        ..Country::default()
                    },
                    tags: tag_pool
                        .iter()
                        .filter(|_| rng.gen_bool(0.5))
                        .map(|t| t.to_string())
                        .collect(),
                    ..Server::default()
                })
                .collect();

            let criteria = FilterCriteria {
                continent: if rng.gen_bool(0.5) {
                    Choice::All
                } else {
                    Choice::Only(continents[rng.gen_range(0..4)].to_string())
                },
                game_mode: if rng.gen_bool(0.5) {
                    Choice::All
                } else {
                    Choice::Only(modes[rng.gen_range(0..modes.len())].to_uppercase())
                },
                show_full_servers: rng.gen(),
                show_empty_servers: rng.gen(),
                show_private_servers: rng.gen(),
                tags: tag_pool
                    .iter()
                    .filter(|_| rng.gen_bool(0.25))
                    .map(|t| t.to_string())
                    .collect(),
            };

            let kept: Vec<&str> = apply_filters(&servers, &criteria)
                .iter()
                .map(|s| s.address.as_str())
                .collect();
            let expected: Vec<&str> = servers
                .iter()
                .filter(|s| {
                    let p1 = criteria.continent == Choice::All
                        || s.country.continent == criteria.continent.as_str();
                    let p2 = criteria.show_full_servers || s.human_count < s.max_players;
                    let p3 = criteria.show_empty_servers || s.human_count != 0;
                    let p4 = criteria.show_private_servers || s.visibility != Visibility::Private;
                    let p5 = criteria.game_mode == Choice::All
                        || s.game_mode.eq_ignore_ascii_case(criteria.game_mode.as_str());
                    let p6 = criteria.tags.iter().all(|t| s.tags.contains(t));
                    p1 && p2 && p3 && p4 && p5 && p6
                })
                .map(|s| s.address.as_str())
                .collect();
            assert_eq!(kept, expected);
        }
    }
}
