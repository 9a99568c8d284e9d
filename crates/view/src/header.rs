//! Query input living outside the search view (the page header).

#![forbid(unsafe_code)]

use shelf_search::codec::{self, KEY_ADVANCED, KEY_QUERY};
use shelf_search::Params;
use tracing::debug;

use crate::bus::{QueryBus, QueryEvent};
use crate::nav::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    /// Commit handed to the search view over the bus.
    Published { delivered: usize },
    Navigate(Location),
}

#[derive(Debug, Clone)]
pub struct HeaderInput {
    text: String,
    bus: QueryBus,
}

impl HeaderInput {
    pub fn new(bus: QueryBus) -> Self { Self { text: String::new(), bus } }

    pub fn text(&self) -> &str { &self.text }

    /// Typing never searches; it only keeps the search view's mirror current.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.bus.publish(QueryEvent::TextChanged(self.text.clone()));
    }

    pub fn sync_from_location(&mut self, location: &Location) {
        self.text = location.params.get(KEY_QUERY).unwrap_or("").to_string();
    }

    /// Search button or Enter.
    ///
    /// On the search page the view owns the pending filters, so the commit goes
    /// over the bus. Elsewhere, the current location's filters are carried to
    /// `/search` in canonical form.
    pub fn submit(&self, current: &Location) -> HeaderAction {
        if current.is_search() {
            let delivered = self.bus.publish(QueryEvent::CommitRequested(self.text.clone()));
            debug!(delivered, "header commit published");
            return HeaderAction::Published { delivered };
        }
        let filters = codec::encode(&codec::decode(&current.params));
        let params = if self.text.trim().is_empty() { filters } else { codec::with_query(filters, &self.text) };
        HeaderAction::Navigate(Location::search(params))
    }

    /// Explicit empty-query entry into the search view.
    pub fn advanced_search(&self) -> Location {
        let mut params = Params::new();
        params.set(KEY_ADVANCED, "1");
        Location::search(params)
    }
}
