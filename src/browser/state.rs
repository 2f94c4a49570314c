use log::{debug, error, warn};

use crate::browser::detail::connect_uri;
use crate::browser::fetch::FetchError;
use crate::browser::filter::FilterCriteria;
use crate::browser::pagination::{self, PageItem, PAGE_SIZE};
use crate::filter_panel::FilterEvent;
use crate::models::server::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

/// Inputs to the server list.
#[derive(Debug)]
pub enum Message {
    /// The one fetch for this mount finished.
    FetchCompleted(Result<Vec<Server>, FetchError>),
    /// A control on the filter panel changed.
    Filter(FilterEvent),
    /// Navigate to a page (clamped into range).
    GoToPage(usize),
    /// Row click, by server address. Must be on the current page.
    Select(String),
    /// Hide the detail view. The selection itself is kept.
    CloseDetail,
    /// Launch the game client for the selected server.
    Connect,
}

/// Side effects for the host to perform after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScrollToTop,
    Launch(String),
}

/// Owns the fetched servers and everything derived from them.
#[derive(Debug)]
pub struct ServerListState {
    phase: Phase,
    servers: Vec<Server>,
    filters: FilterCriteria,
    /// Indices into `servers` accepted by `filters`, in order.
    visible: Vec<usize>,
    current_page: usize,
    selected: Option<Server>,
    detail_open: bool,
}

impl Default for ServerListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerListState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            servers: Vec::new(),
            filters: FilterCriteria::default(),
            visible: Vec::new(),
            current_page: 1,
            selected: None,
            detail_open: false,
        }
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::FetchCompleted(result) => {
                self.servers = match result {
                    Ok(servers) => {
                        debug!("Loaded {} servers", servers.len());
                        servers
                    }
                    Err(e) => {
                        error!("Failed to fetch server list: {}", e);
                        Vec::new()
                    }
                };
                self.phase = Phase::Ready;
                self.refilter()
            }
            Message::Filter(event) => {
                self.filters.apply(event);
                self.refilter()
            }
            Message::GoToPage(page) => self.go_to_page(page),
            Message::Select(address) => {
                let found = self.page().into_iter().find(|s| s.address == address).cloned();
                match found {
                    Some(server) => {
                        self.selected = Some(server);
                        self.detail_open = true;
                    }
                    None => warn!("Selected server {} is not on the current page", address),
                }
                Vec::new()
            }
            Message::CloseDetail => {
                self.detail_open = false;
                Vec::new()
            }
            Message::Connect => self
                .selected()
                .and_then(|server| connect_uri(&server.address))
                .map(|uri| vec![Effect::Launch(uri)])
                .unwrap_or_default(),
        }
    }

    fn refilter(&mut self) -> Vec<Effect> {
        self.visible = self
            .servers
            .iter()
            .enumerate()
            .filter(|(_, server)| self.filters.matches(server))
            .map(|(i, _)| i)
            .collect();
        // Shrinking the result set may leave the current page out of range.
        self.go_to_page(self.current_page)
    }

    fn go_to_page(&mut self, page: usize) -> Vec<Effect> {
        let page = pagination::clamp_page(page, self.total_pages());
        if page == self.current_page {
            return Vec::new();
        }
        self.current_page = page;
        vec![Effect::ScrollToTop]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn filtered(&self) -> Vec<&Server> {
        self.visible.iter().map(|&i| &self.servers[i]).collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.visible.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.visible.len())
    }

    /// Servers on the current page.
    pub fn page(&self) -> Vec<&Server> {
        pagination::paginate(&self.visible, self.current_page)
            .iter()
            .map(|&i| &self.servers[i])
            .collect()
    }

    pub fn indicators(&self) -> Vec<PageItem> {
        pagination::page_indicators(self.current_page, self.total_pages())
    }

    /// The page holding `address` in the filtered view.
    pub fn page_of(&self, address: &str) -> Option<usize> {
        self.visible
            .iter()
            .position(|&i| self.servers[i].address == address)
            .map(|pos| pos / PAGE_SIZE + 1)
    }

    /// The selected server while the detail view is open.
    pub fn selected(&self) -> Option<&Server> {
        self.selected.as_ref().filter(|_| self.detail_open)
    }

    pub fn is_detail_open(&self) -> bool {
        self.detail_open
    }
}
