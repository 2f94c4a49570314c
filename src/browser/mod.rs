//! Server list engine: fetch, filter, paginate, select.
//!
//! `state::ServerListState` owns one fetched snapshot and derives the
//! filtered and paged views from it through pure functions in `filter` and
//! `pagination`. Everything reaches it as a `state::Message`.

pub mod detail;
pub mod fetch;
pub mod filter;
pub mod pagination;
pub mod state;

pub use detail::{connect_uri, segment_name, NameColor, NameSegment, ServerDetail};
pub use fetch::{normalize_servers, parse_servers, spawn_fetch, FetchError, HttpServerSource, ServerSource};
pub use filter::{apply_filters, Choice, FilterCriteria};
pub use pagination::{page_indicators, paginate, total_pages, PageItem, PAGE_SIZE};
pub use state::{Effect, Message, Phase, ServerListState};
