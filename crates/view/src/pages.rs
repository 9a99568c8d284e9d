//! Incremental reveal of a result set, one fixed-size page at a time.

#![forbid(unsafe_code)]

use serde::Serialize;
use shelf_core::BookId;

pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub items_loaded: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    all: Vec<BookId>,
    items_loaded: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self { Self::new(PAGE_SIZE) }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self { all: Vec::new(), items_loaded: page_size, page_size }
    }

    /// Replace the result set and fall back to the first page.
    pub fn reset(&mut self, all: Vec<BookId>) {
        self.all = all;
        self.items_loaded = self.page_size;
    }

    /// Reveal one more page. No-op once everything is shown.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() { return false; }
        self.items_loaded += self.page_size;
        true
    }

    pub fn displayed(&self) -> &[BookId] { &self.all[..self.items_loaded.min(self.all.len())] }
    pub fn has_more(&self) -> bool { self.all.len() > self.items_loaded }
    pub fn all(&self) -> &[BookId] { &self.all }
    pub fn total(&self) -> usize { self.all.len() }
    pub fn page_size(&self) -> usize { self.page_size }

    pub fn window(&self) -> PageWindow {
        PageWindow { items_loaded: self.items_loaded, has_more: self.has_more() }
    }
}
