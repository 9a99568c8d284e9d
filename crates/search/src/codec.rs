//! Filter codec: `SearchFilters` <-> flat URL-style parameters.
//!
//! Only non-default fields are emitted, so `encode` doubles as canonicalisation.
//! `discount=false` has no wire form and decodes back to "no constraint".

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;

use crate::filters::{
    SearchFilters, SortBy, PAGES_MAX_DEFAULT, PAGES_MIN_DEFAULT, PRICE_MAX_DEFAULT, PRICE_MIN_DEFAULT,
};

pub const KEY_QUERY: &str = "q";
pub const KEY_ADVANCED: &str = "advanced";
pub const KEY_TAGS: &str = "tags";
pub const KEY_PRICE_MIN: &str = "priceMin";
pub const KEY_PRICE_MAX: &str = "priceMax";
pub const KEY_PAGES_MIN: &str = "pagesMin";
pub const KEY_PAGES_MAX: &str = "pagesMax";
pub const KEY_DISCOUNT: &str = "discount";
pub const KEY_SORT_BY: &str = "sortBy";

/// Flat string-keyed parameter set. Keys are unique; the first occurrence wins on parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }
    pub fn contains(&self, key: &str) -> bool { self.0.contains_key(key) }
    pub fn set(&mut self, key: &str, value: impl Into<String>) { self.0.insert(key.to_string(), value.into()); }
    pub fn remove(&mut self, key: &str) -> Option<String> { self.0.remove(key) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `a=1&b=2` (leading `?` tolerated), percent- and plus-decoding values.
    pub fn parse_query_string(s: &str) -> Self {
        let s = s.strip_prefix('?').unwrap_or(s);
        let mut map = BTreeMap::new();
        for (k, v) in url::form_urlencoded::parse(s.as_bytes()) {
            map.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
        Self(map)
    }

    pub fn to_query_string(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.0.iter() {
            ser.append_pair(k, v);
        }
        ser.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (k, v) in iter {
            map.entry(k.into()).or_insert_with(|| v.into());
        }
        Self(map)
    }
}

pub fn encode(f: &SearchFilters) -> Params {
    let mut p = Params::new();
    if !f.tags.is_empty() {
        let joined: Vec<&str> = f.tags.iter().map(String::as_str).collect();
        p.set(KEY_TAGS, joined.join(","));
    }
    if f.price_min != PRICE_MIN_DEFAULT { p.set(KEY_PRICE_MIN, f.price_min.to_string()); }
    if f.price_max != PRICE_MAX_DEFAULT { p.set(KEY_PRICE_MAX, f.price_max.to_string()); }
    if f.pages_min != PAGES_MIN_DEFAULT { p.set(KEY_PAGES_MIN, f.pages_min.to_string()); }
    if f.pages_max != PAGES_MAX_DEFAULT { p.set(KEY_PAGES_MAX, f.pages_max.to_string()); }
    if f.discount == Some(true) { p.set(KEY_DISCOUNT, "true"); }
    if f.sort_by != SortBy::Relevance { p.set(KEY_SORT_BY, f.sort_by.as_str()); }
    p
}

/// Decode filters, ignoring `q`/`advanced` and normalising anything malformed to defaults.
pub fn decode(p: &Params) -> SearchFilters {
    let tags = p
        .get(KEY_TAGS)
        .map(|s| s.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    let price_min = parse_price(p.get(KEY_PRICE_MIN)).unwrap_or(PRICE_MIN_DEFAULT);
    let price_max = parse_price(p.get(KEY_PRICE_MAX)).unwrap_or(PRICE_MAX_DEFAULT);
    let pages_min = parse_pages(p.get(KEY_PAGES_MIN)).unwrap_or(PAGES_MIN_DEFAULT);
    let pages_max = parse_pages(p.get(KEY_PAGES_MAX)).unwrap_or(PAGES_MAX_DEFAULT);
    SearchFilters {
        tags,
        price_min,
        price_max: price_max.max(price_min),
        pages_min,
        pages_max: pages_max.max(pages_min),
        discount: (p.get(KEY_DISCOUNT) == Some("true")).then_some(true),
        sort_by: p.get(KEY_SORT_BY).and_then(SortBy::from_param).unwrap_or_default(),
    }
}

/// Canonical form of a parameter set: filters re-encoded, `q` carried over verbatim.
pub fn canonicalize(p: &Params) -> Params {
    let out = encode(&decode(p));
    match p.get(KEY_QUERY) {
        Some(q) => with_query(out, q),
        None => out,
    }
}

/// Attach the free-text query; blank queries are left out.
pub fn with_query(mut p: Params, q: &str) -> Params {
    if !q.is_empty() {
        p.set(KEY_QUERY, q);
    }
    p
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() { return None; }
    let v: f64 = raw.parse().ok()?;
    v.is_finite().then(|| v.max(0.0))
}

fn parse_pages(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    raw.parse().ok()
}
