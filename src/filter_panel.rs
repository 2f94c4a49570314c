//! Filter controls. The panel holds no filter state of its own: every
//! interaction becomes a `FilterEvent` sent to the owning server list.

use std::collections::BTreeSet;
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::browser::filter::Choice;

pub const DEFAULT_TAG_DEBOUNCE_MS: u64 = 300;

/// `(label, value)` pairs for the game mode select.
pub const GAME_MODES: &[(&str, &str)] = &[
    ("All Gamemodes", "all"),
    ("Clan Arena", "Clan Arena"),
    ("Duel", "Duel"),
    ("Capture The Flag", "Capture The Flag"),
    ("Team Deathmatch", "Team Deathmatch"),
    ("Free For All", "Free For All"),
];

/// `(label, value)` pairs for the region select.
pub const REGIONS: &[(&str, &str)] = &[
    ("All Regions", "all"),
    ("NA", "NA"),
    ("SA", "SA"),
    ("EU", "EU"),
    ("AF", "AF"),
    ("AS", "AS"),
    ("OC", "OC"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    GameMode(Choice),
    Region(Choice),
    ShowFull(bool),
    ShowEmpty(bool),
    ShowPrivate(bool),
    Tags(BTreeSet<String>),
}

/// Comma-separated input to a tag set. Blank segments are dropped, so empty
/// input yields an empty set.
pub fn parse_tags(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Delivers only the last value pushed within `delay` of the previous one.
/// Each push cancels the pending delivery and starts a new timer; dropping
/// the debouncer cancels whatever is pending.
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<T>) -> Self {
        Self {
            delay,
            tx,
            pending: Mutex::new(None),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn push(&self, value: T) {
        let tx = self.tx.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(value).is_err() {
                debug!("Debounced value dropped, receiver is gone");
            }
        });
        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct FilterPanel {
    tx: mpsc::UnboundedSender<FilterEvent>,
    tags: Debouncer<FilterEvent>,
}

impl FilterPanel {
    pub fn new(tx: mpsc::UnboundedSender<FilterEvent>) -> Self {
        Self::with_debounce(tx, Duration::from_millis(DEFAULT_TAG_DEBOUNCE_MS))
    }

    pub fn with_debounce(tx: mpsc::UnboundedSender<FilterEvent>, delay: Duration) -> Self {
        let tags = Debouncer::new(delay, tx.clone());
        Self { tx, tags }
    }

    fn emit(&self, event: FilterEvent) {
        if self.tx.send(event).is_err() {
            debug!("Filter change ignored, server list is gone");
        }
    }

    pub fn select_game_mode(&self, value: &str) {
        self.emit(FilterEvent::GameMode(Choice::parse(value)));
    }

    pub fn select_region(&self, value: &str) {
        self.emit(FilterEvent::Region(Choice::parse(value)));
    }

    pub fn set_show_full(&self, show: bool) {
        self.emit(FilterEvent::ShowFull(show));
    }

    pub fn set_show_empty(&self, show: bool) {
        self.emit(FilterEvent::ShowEmpty(show));
    }

    pub fn set_show_private(&self, show: bool) {
        self.emit(FilterEvent::ShowPrivate(show));
    }

    /// Tag text is debounced; see [`Debouncer`].
    pub fn input_tags(&self, raw: &str) {
        self.tags.push(FilterEvent::Tags(parse_tags(raw)));
    }
}
