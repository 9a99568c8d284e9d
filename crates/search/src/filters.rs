//! Structured filter set and the per-book predicates of the filter stage.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use serde::Serialize;
use shelf_core::BookRecord;

pub const PRICE_MIN_DEFAULT: f64 = 0.0;
pub const PRICE_MAX_DEFAULT: f64 = 1000.0;
pub const PAGES_MIN_DEFAULT: u32 = 0;
pub const PAGES_MAX_DEFAULT: u32 = 520;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Text-stage order when a query is given, catalog order otherwise.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::PriceAsc => "price-asc",
            SortBy::PriceDesc => "price-desc",
        }
    }

    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "relevance" => Some(SortBy::Relevance),
            "price-asc" => Some(SortBy::PriceAsc),
            "price-desc" => Some(SortBy::PriceDesc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchFilters {
    pub tags: BTreeSet<String>,
    pub price_min: f64,
    pub price_max: f64,
    pub pages_min: u32,
    pub pages_max: u32,
    /// `Some(true)`: discounted only, `Some(false)`: full price only, `None`: either.
    pub discount: Option<bool>,
    pub sort_by: SortBy,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            tags: BTreeSet::new(),
            price_min: PRICE_MIN_DEFAULT,
            price_max: PRICE_MAX_DEFAULT,
            pages_min: PAGES_MIN_DEFAULT,
            pages_max: PAGES_MAX_DEFAULT,
            discount: None,
            sort_by: SortBy::Relevance,
        }
    }
}

// Bound edits clamp toward the opposite bound instead of rejecting.
impl SearchFilters {
    pub fn set_price_min(&mut self, v: f64) {
        let v = if v.is_finite() { v.max(0.0) } else { PRICE_MIN_DEFAULT };
        self.price_min = v.min(self.price_max);
    }

    pub fn set_price_max(&mut self, v: f64) {
        let v = if v.is_finite() { v } else { PRICE_MAX_DEFAULT };
        self.price_max = v.max(self.price_min);
    }

    pub fn clear_price_min(&mut self) { self.set_price_min(PRICE_MIN_DEFAULT) }
    pub fn clear_price_max(&mut self) { self.set_price_max(PRICE_MAX_DEFAULT) }

    pub fn set_pages_min(&mut self, v: u32) { self.pages_min = v.min(self.pages_max); }
    pub fn set_pages_max(&mut self, v: u32) { self.pages_max = v.max(self.pages_min); }

    pub fn clear_pages_min(&mut self) { self.set_pages_min(PAGES_MIN_DEFAULT) }
    pub fn clear_pages_max(&mut self) { self.set_pages_max(PAGES_MAX_DEFAULT) }

    /// Checkbox semantics: unchecking drops the constraint rather than inverting it.
    pub fn set_discount_only(&mut self, on: bool) {
        self.discount = if on { Some(true) } else { None };
    }

    /// Add the tag if absent, remove it otherwise. Returns whether it is now selected.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        if self.tags.remove(tag) {
            false
        } else {
            self.tags.insert(tag.to_string());
            true
        }
    }

    pub fn is_default(&self) -> bool { *self == Self::default() }

    pub(crate) fn tags_match(&self, b: &BookRecord) -> bool {
        self.tags.is_empty() || b.tags.iter().any(|t| self.tags.contains(t))
    }

    pub(crate) fn price_match(&self, b: &BookRecord) -> bool {
        let p = b.effective_price();
        p >= self.price_min && p <= self.price_max
    }

    /// Books with an unknown page count always pass.
    pub(crate) fn pages_match(&self, b: &BookRecord) -> bool {
        b.pages.map(|p| p >= self.pages_min && p <= self.pages_max).unwrap_or(true)
    }

    pub(crate) fn discount_match(&self, b: &BookRecord) -> bool {
        match self.discount {
            Some(want) => b.has_active_discount() == want,
            None => true,
        }
    }

    pub fn matches(&self, b: &BookRecord) -> bool {
        self.tags_match(b) && self.price_match(b) && self.pages_match(b) && self.discount_match(b)
    }
}
