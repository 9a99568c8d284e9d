//! Genre tag index backing the tag picker of the filter panel.

#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;
use shelf_core::Catalog;

/// Tags shown before the picker collapses behind a "show more" toggle.
pub const VISIBLE_TAGS: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags: Vec<String>,
    counts: FxHashMap<String, usize>,
}

impl TagIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for b in catalog.books() {
            for t in b.tags.iter() {
                *counts.entry(t.clone()).or_default() += 1;
            }
        }
        let mut tags: Vec<String> = counts.keys().cloned().collect();
        tags.sort();
        Self { tags, counts }
    }

    /// Every distinct tag, sorted.
    pub fn all(&self) -> &[String] { &self.tags }

    pub fn count(&self, tag: &str) -> usize { self.counts.get(tag).copied().unwrap_or(0) }

    /// Tags matching the picker's search box, still in alphabetical order.
    pub fn suggest(&self, needle: &str) -> Vec<&str> {
        let needle = needle.trim();
        if needle.is_empty() {
            return self.tags.iter().map(String::as_str).collect();
        }
        let needle = needle.to_lowercase();
        self.tags
            .iter()
            .filter(|t| t.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn visible(&self, needle: &str, show_all: bool) -> Vec<&str> {
        let mut v = self.suggest(needle);
        if !show_all { v.truncate(VISIBLE_TAGS); }
        v
    }

    pub fn has_overflow(&self, needle: &str) -> bool { self.suggest(needle).len() > VISIBLE_TAGS }
}
