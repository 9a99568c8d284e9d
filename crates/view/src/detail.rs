#![forbid(unsafe_code)]

use shelf_core::{BookId, BookRecord, Catalog};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookDetail<'a> {
    Found { id: BookId, book: &'a BookRecord },
    NotFound,
}

impl<'a> BookDetail<'a> {
    /// Resolve the `/book/:id` segment. Leading digits count (`"7abc"` is 7),
    /// an empty segment means the first book, anything else is not found.
    pub fn lookup(catalog: &'a Catalog, raw_id: &str) -> Self {
        match parse_id(raw_id).and_then(|id| catalog.get(id).map(|book| (id, book))) {
            Some((id, book)) => BookDetail::Found { id, book },
            None => BookDetail::NotFound,
        }
    }
}

fn parse_id(raw: &str) -> Option<BookId> {
    let s = if raw.is_empty() { "0" } else { raw.trim_start() };
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    let n: u64 = digits[..end].parse().ok()?;
    if negative && n != 0 { return None; }
    BookId::try_from(n).ok()
}
