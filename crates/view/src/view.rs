//! Search view state: location-derived active filters, pending edits, the live
//! query mirror fed by the bus, and the paginated result set.
//!
//! Results are recomputed only when the committed `(query, active filters)` pair
//! changes; the last pair is kept in a single memo slot.

#![forbid(unsafe_code)]

use std::sync::Arc;

use serde::Serialize;
use shelf_core::{BookId, BookRecord};
use shelf_search::codec::{self, KEY_ADVANCED, KEY_QUERY};
use shelf_search::{Index, Params, SearchDebugInfo, SearchFilters};
use tracing::debug;

use crate::bus::{QueryBus, QueryEvent, QuerySubscription};
use crate::nav::Location;
use crate::pages::{PageWindow, Paginator, PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self { Self { page_size: PAGE_SIZE } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// Entered through "advanced search" with no query yet.
    AwaitingInput,
    NoResults,
}

pub struct SearchView {
    index: Arc<Index>,
    sub: QuerySubscription,
    location: Params,
    active: SearchFilters,
    pending: SearchFilters,
    live_query: String,
    committed: Option<(String, SearchFilters)>,
    pages: Paginator,
    debug: SearchDebugInfo,
}

impl SearchView {
    /// Subscribe to the bus and derive everything from the current location.
    pub fn mount(index: Arc<Index>, bus: &QueryBus, location: Params, cfg: ViewConfig) -> Self {
        let mut view = Self {
            index,
            sub: bus.subscribe(),
            location: Params::new(),
            active: SearchFilters::default(),
            pending: SearchFilters::default(),
            live_query: String::new(),
            committed: None,
            pages: Paginator::new(cfg.page_size),
            debug: SearchDebugInfo::default(),
        };
        view.on_location_change(location);
        view
    }

    /// Navigation or back/forward: location wins over any pending edits.
    pub fn on_location_change(&mut self, location: Params) {
        let filters = codec::decode(&location);
        self.active = filters.clone();
        self.pending = filters;
        self.live_query = location.get(KEY_QUERY).unwrap_or("").to_string();
        self.location = location;
        self.refresh();
    }

    pub fn location(&self) -> &Params { &self.location }
    pub fn query(&self) -> &str { self.location.get(KEY_QUERY).unwrap_or("") }
    pub fn live_query(&self) -> &str { &self.live_query }
    pub fn active(&self) -> &SearchFilters { &self.active }
    pub fn pending(&self) -> &SearchFilters { &self.pending }

    /// Filter panel edits land here and stay uncommitted until apply.
    pub fn pending_mut(&mut self) -> &mut SearchFilters { &mut self.pending }

    /// Commit pending filters with the live query, falling back to the location query.
    pub fn apply(&mut self) -> Location {
        let q = if self.live_query.is_empty() { self.query().to_string() } else { self.live_query.clone() };
        self.commit(q)
    }

    /// Back to default filters, keeping only the query.
    pub fn reset(&mut self) -> Location {
        self.pending = SearchFilters::default();
        self.active = SearchFilters::default();
        let params = codec::with_query(Params::new(), self.query());
        self.live_query = self.query().to_string();
        self.location = params.clone();
        self.refresh();
        Location::search(params)
    }

    /// Handle bus traffic published since the last call. Returns the newest commit target, if any.
    pub fn pump(&mut self) -> Option<Location> {
        let mut target = None;
        for ev in self.sub.drain() {
            match ev {
                QueryEvent::TextChanged(q) => self.live_query = q,
                QueryEvent::CommitRequested(q) => {
                    let q = q.trim().to_string();
                    target = Some(self.commit(q));
                }
            }
        }
        target
    }

    pub fn load_more(&mut self) -> bool { self.pages.load_more() }

    pub fn displayed_ids(&self) -> &[BookId] { self.pages.displayed() }

    pub fn displayed(&self) -> Vec<(BookId, &BookRecord)> {
        let catalog = self.index.catalog();
        self.pages.displayed().iter().filter_map(|id| catalog.get(*id).map(|b| (*id, b))).collect()
    }

    pub fn has_more(&self) -> bool { self.pages.has_more() }
    pub fn total(&self) -> usize { self.pages.total() }
    pub fn window(&self) -> PageWindow { self.pages.window() }
    pub fn debug_info(&self) -> &SearchDebugInfo { &self.debug }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.location.contains(KEY_QUERY) && self.location.contains(KEY_ADVANCED) {
            Some(EmptyState::AwaitingInput)
        } else if self.pages.displayed().is_empty() {
            Some(EmptyState::NoResults)
        } else {
            None
        }
    }

    fn commit(&mut self, q: String) -> Location {
        self.active = self.pending.clone();
        let params = codec::with_query(codec::encode(&self.pending), &q);
        self.live_query = q;
        self.location = params.clone();
        self.refresh();
        Location::search(params)
    }

    /// Re-run the search if the committed pair changed. Returns whether it ran.
    fn refresh(&mut self) -> bool {
        let key = (self.query().to_string(), self.active.clone());
        if self.committed.as_ref() == Some(&key) {
            return false;
        }
        let (hits, dbg) = self.index.search_with_debug(&key.0, &key.1);
        self.pages.reset(hits.into_iter().map(|h| h.doc).collect());
        debug!(query = %key.0, total = self.pages.total(), "search view refreshed");
        self.debug = dbg;
        self.committed = Some(key);
        true
    }
}
