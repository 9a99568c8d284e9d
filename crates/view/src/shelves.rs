//! Home page carousels.

#![forbid(unsafe_code)]

use serde::Serialize;
use shelf_core::{BookId, BookRecord, Catalog};

pub const SHELF_LIMIT: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    pub genre: String,
    pub author: String,
    pub limit: usize,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self { genre: "Classics".to_string(), author: "Leo Tolstoy".to_string(), limit: SHELF_LIMIT }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfKind {
    Recommended,
    Sale,
    Genre,
    Author,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shelf {
    pub kind: ShelfKind,
    pub title: String,
    pub books: Vec<BookId>,
}

pub fn build_shelves(catalog: &Catalog, cfg: &ShelfConfig) -> Vec<Shelf> {
    let pick = |pred: &dyn Fn(&BookRecord) -> bool| -> Vec<BookId> {
        catalog.iter().filter(|(_, b)| pred(*b)).map(|(id, _)| id).take(cfg.limit).collect()
    };
    vec![
        // No sale price at all, not merely an inactive one.
        Shelf { kind: ShelfKind::Recommended, title: "Recommended reading".into(), books: pick(&|b: &BookRecord| b.discount.is_none()) },
        Shelf { kind: ShelfKind::Sale, title: "Sale".into(), books: pick(&|b: &BookRecord| b.has_active_discount()) },
        Shelf { kind: ShelfKind::Genre, title: format!("Genre: {}", cfg.genre), books: pick(&|b: &BookRecord| b.has_tag(&cfg.genre)) },
        Shelf { kind: ShelfKind::Author, title: format!("By {}", cfg.author), books: pick(&|b: &BookRecord| b.author == cfg.author) },
    ]
}
