//! Shelf core types: book records and the read-only catalog.
//! The catalog is loaded once and never mutated; everything else addresses it by position.

#![forbid(unsafe_code)]

use std::path::Path;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

/// Position of a book inside the catalog.
pub type BookId = u32;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid record #{index} ({name}): {reason}")]
    InvalidRecord { index: usize, name: String, reason: &'static str },
    #[error("catalog too large: {0} records")]
    TooLarge(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub name: String,
    pub author: String,
    pub price: f64,
    /// Sale price. Only counts when strictly below `price`.
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: SmallVec<[String; 4]>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl BookRecord {
    /// The sale price if it undercuts the list price.
    pub fn active_discount(&self) -> Option<f64> {
        self.discount.filter(|d| *d < self.price)
    }

    pub fn has_active_discount(&self) -> bool { self.active_discount().is_some() }

    /// Price the shopper actually pays.
    pub fn effective_price(&self) -> f64 {
        self.active_discount().unwrap_or(self.price)
    }

    pub fn has_tag(&self, tag: &str) -> bool { self.tags.iter().any(|t| t == tag) }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.price.is_finite() || self.price < 0.0 { return Err("price must be a finite non-negative number"); }
        if let Some(d) = self.discount {
            if !d.is_finite() || d < 0.0 { return Err("discount must be a finite non-negative number"); }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<BookRecord>,
}

const BUNDLED: &str = include_str!("../data/books.json");

impl Catalog {
    /// Build a catalog, rejecting records whose prices cannot be compared.
    pub fn new(books: Vec<BookRecord>) -> Result<Self, CatalogError> {
        if books.len() > BookId::MAX as usize { return Err(CatalogError::TooLarge(books.len())); }
        for (index, b) in books.iter().enumerate() {
            b.validate().map_err(|reason| CatalogError::InvalidRecord { index, name: b.name.clone(), reason })?;
        }
        Ok(Self { books })
    }

    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let books: Vec<BookRecord> = serde_json::from_str(s)?;
        Self::new(books)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let cat = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), books = cat.len(), "catalog loaded");
        Ok(cat)
    }

    /// Demo storefront catalog shipped with the crate.
    pub fn bundled() -> Result<Self, CatalogError> { Self::from_json_str(BUNDLED) }

    pub fn len(&self) -> usize { self.books.len() }
    pub fn is_empty(&self) -> bool { self.books.is_empty() }
    pub fn books(&self) -> &[BookRecord] { &self.books }

    pub fn get(&self, id: BookId) -> Option<&BookRecord> { self.books.get(id as usize) }

    /// Books paired with their catalog position, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (BookId, &BookRecord)> + '_ {
        self.books.iter().enumerate().map(|(i, b)| (i as BookId, b))
    }
}

pub mod prelude {
    pub use super::{BookId, BookRecord, Catalog, CatalogError};
}
