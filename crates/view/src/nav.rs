//! Locations handed to the external navigation primitive.

#![forbid(unsafe_code)]

use serde::Serialize;
use shelf_core::BookId;
use shelf_search::Params;

pub const HOME_PATH: &str = "/";
pub const SEARCH_PATH: &str = "/search";
pub const BOOK_PREFIX: &str = "/book/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    Search,
    /// Raw id segment, parsed by the detail view.
    Book(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub params: Params,
}

impl Location {
    pub fn home() -> Self { Self { path: HOME_PATH.to_string(), params: Params::new() } }
    pub fn search(params: Params) -> Self { Self { path: SEARCH_PATH.to_string(), params } }
    pub fn book(id: BookId) -> Self { Self { path: format!("{BOOK_PREFIX}{id}"), params: Params::new() } }

    /// Split `path?query` into a location.
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, qs)) => Self { path: path.to_string(), params: Params::parse_query_string(qs) },
            None => Self { path: href.to_string(), params: Params::new() },
        }
    }

    /// Unknown paths fall back to the home page.
    pub fn route(&self) -> Route<'_> {
        if self.path == SEARCH_PATH {
            Route::Search
        } else if let Some(id) = self.path.strip_prefix(BOOK_PREFIX) {
            Route::Book(id)
        } else {
            Route::Home
        }
    }

    pub fn is_search(&self) -> bool { self.path == SEARCH_PATH }

    pub fn to_href(&self) -> String {
        if self.params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.params.to_query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render() {
        let loc = Location::parse("/search?q=dune&sortBy=price-asc");
        assert!(loc.is_search());
        assert_eq!(loc.params.get("q"), Some("dune"));
        assert_eq!(loc.to_href(), "/search?q=dune&sortBy=price-asc");
        assert_eq!(Location::search(Params::new()).to_href(), "/search");
    }

    #[test]
    fn routes() {
        assert_eq!(Location::parse("/book/7").route(), Route::Book("7"));
        assert_eq!(Location::book(3).route(), Route::Book("3"));
        assert_eq!(Location::parse("/nowhere").route(), Route::Home);
        assert_eq!(Location::home().route(), Route::Home);
    }
}
