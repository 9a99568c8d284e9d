//! Shelf search: in-RAM query over the catalog.
//! Pipeline: fuzzy text stage on name/author, order-preserving filter stage, optional price sort.

#![forbid(unsafe_code)]

use std::sync::Arc;

use shelf_core::{BookId, BookRecord, Catalog};
use tracing::debug;

pub mod codec;
pub mod filters;
pub mod tags;
mod text;

pub use codec::{decode, encode, Params};
pub use filters::{SearchFilters, SortBy};
pub use tags::TagIndex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub doc: BookId,
    /// Text relevance in `(0, 1]`, higher is better; `0` when no query was given.
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SearchDebugInfo {
    pub total: usize,
    pub after_text: usize,
    pub after_tags: usize,
    pub after_price: usize,
    pub after_pages: usize,
    pub after_discount: usize,
}

pub struct Index {
    catalog: Arc<Catalog>,
    texts: Vec<text::TextEntry>,
}

impl Index {
    pub fn build(catalog: Arc<Catalog>) -> Self {
        let texts = catalog
            .books()
            .iter()
            .map(|b| text::TextEntry { name: text::TextField::new(&b.name), author: text::TextField::new(&b.author) })
            .collect();
        metrics::gauge!("index_docs", catalog.len() as f64);
        Self { catalog, texts }
    }

    pub fn catalog(&self) -> &Arc<Catalog> { &self.catalog }

    pub fn search(&self, q: &str, filters: &SearchFilters) -> Vec<Hit> {
        self.search_with_debug(q, filters).0
    }

    /// Matching books themselves, in result order.
    pub fn search_books(&self, q: &str, filters: &SearchFilters) -> Vec<&BookRecord> {
        self.search(q, filters).into_iter().filter_map(|h| self.catalog.get(h.doc)).collect()
    }

    pub fn search_with_debug(&self, q: &str, filters: &SearchFilters) -> (Vec<Hit>, SearchDebugInfo) {
        let started = std::time::Instant::now();
        let books = self.catalog.books();
        let total = books.len();

        // Text stage
        let pattern = text::prepare(q);
        let mut hits: Vec<Hit> = if pattern.is_empty() {
            (0..total).map(|i| Hit { doc: i as BookId, score: 0.0 }).collect()
        } else {
            let mut scored: Vec<Hit> = self
                .texts
                .iter()
                .enumerate()
                .filter_map(|(i, e)| {
                    text::score_entry(&pattern, e).map(|s| Hit { doc: i as BookId, score: (1.0 - s) as f32 })
                })
                .collect();
            scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc.cmp(&b.doc)));
            scored
        };
        let after_text = hits.len();
        metrics::histogram!("search_candidates", after_text as f64);

        // Filter stage, one predicate at a time so the debug counts line up
        let book = |h: &Hit| &books[h.doc as usize];
        hits.retain(|h| filters.tags_match(book(h)));
        let after_tags = hits.len();
        hits.retain(|h| filters.price_match(book(h)));
        let after_price = hits.len();
        hits.retain(|h| filters.pages_match(book(h)));
        let after_pages = hits.len();
        hits.retain(|h| filters.discount_match(book(h)));
        let after_discount = hits.len();

        // Sort stage (stable: equal prices keep their relative order)
        match filters.sort_by {
            SortBy::PriceAsc => hits.sort_by(|a, b| book(a).effective_price().total_cmp(&book(b).effective_price())),
            SortBy::PriceDesc => hits.sort_by(|a, b| book(b).effective_price().total_cmp(&book(a).effective_price())),
            SortBy::Relevance => {}
        }

        let dbg = SearchDebugInfo { total, after_text, after_tags, after_price, after_pages, after_discount };
        let elapsed = started.elapsed();
        metrics::histogram!("search_eval_ms", elapsed.as_secs_f64() * 1_000.0);
        debug!(query = %q.trim(), results = hits.len(), ?dbg, "search evaluated");
        (hits, dbg)
    }
}

/// One-shot search without keeping an index around.
pub fn search_books<'a>(catalog: &'a Arc<Catalog>, q: &str, filters: &SearchFilters) -> Vec<&'a BookRecord> {
    let idx = Index::build(Arc::clone(catalog));
    idx.search(q, filters).into_iter().filter_map(|h| catalog.get(h.doc)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    fn book(name: &str, author: &str, price: f64, discount: Option<f64>, tags: &[&str], pages: Option<u32>) -> BookRecord {
        BookRecord {
            name: name.to_string(),
            author: author.to_string(),
            price,
            discount,
            image: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect::<SmallVec<_>>(),
            pages,
            description: None,
        }
    }

    fn index(books: Vec<BookRecord>) -> Index { Index::build(Arc::new(Catalog::new(books).unwrap())) }

    fn names(idx: &Index, q: &str, f: &SearchFilters) -> Vec<String> {
        idx.search_books(q, f).into_iter().map(|b| b.name.clone()).collect()
    }

    fn discount_only() -> SearchFilters { SearchFilters { discount: Some(true), ..SearchFilters::default() } }

    #[test]
    fn active_discount_book_is_found() {
        let idx = index(vec![book("A", "x", 100.0, Some(80.0), &[], None)]);
        assert_eq!(names(&idx, "", &discount_only()), vec!["A"]);
    }

    #[test]
    fn discount_not_below_price_is_ignored() {
        let idx = index(vec![book("A", "x", 100.0, Some(150.0), &[], None)]);
        assert!(names(&idx, "", &discount_only()).is_empty());
        let full_price = SearchFilters { discount: Some(false), ..SearchFilters::default() };
        assert_eq!(names(&idx, "", &full_price), vec!["A"]);
    }

    #[test]
    fn misspelled_author_matches() {
        let idx = index(vec![
            book("Hamlet", "William Shakespeare", 300.0, None, &[], None),
            book("Emma", "Jane Austen", 300.0, None, &[], None),
        ]);
        assert_eq!(names(&idx, "Shakespere", &SearchFilters::default()), vec!["Hamlet"]);
    }

    #[test]
    fn empty_query_is_catalog_order() {
        let idx = index(vec![
            book("C", "x", 3.0, None, &[], None),
            book("A", "x", 1.0, None, &[], None),
            book("B", "x", 2.0, None, &[], None),
        ]);
        assert_eq!(names(&idx, "   ", &SearchFilters::default()), vec!["C", "A", "B"]);
    }

    #[test]
    fn text_results_ordered_by_relevance() {
        let idx = index(vec![
            book("The Art of War", "Sun Tzu", 10.0, None, &[], None),
            book("War", "Someone", 10.0, None, &[], None),
        ]);
        let (hits, _) = idx.search_with_debug("war", &SearchFilters::default());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc, 1);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn effective_price_drives_price_filter() {
        let idx = index(vec![
            book("Cheap via sale", "x", 900.0, Some(90.0), &[], None),
            book("Fake sale", "x", 150.0, Some(900.0), &[], None),
        ]);
        let f = SearchFilters { price_max: 100.0, ..SearchFilters::default() };
        assert_eq!(names(&idx, "", &f), vec!["Cheap via sale"]);
    }

    #[test]
    fn unknown_page_count_is_never_excluded() {
        let idx = index(vec![
            book("Short", "x", 10.0, None, &[], Some(40)),
            book("Unknown", "x", 10.0, None, &[], None),
            book("Long", "x", 10.0, None, &[], Some(900)),
        ]);
        let f = SearchFilters { pages_min: 100, pages_max: 520, ..SearchFilters::default() };
        assert_eq!(names(&idx, "", &f), vec!["Unknown"]);
    }

    #[test]
    fn tag_filter_is_intersection() {
        let idx = index(vec![
            book("A", "x", 10.0, None, &["Drama"], None),
            book("B", "x", 10.0, None, &["Poetry"], None),
            book("C", "x", 10.0, None, &[], None),
        ]);
        let mut f = SearchFilters::default();
        f.toggle_tag("Drama");
        f.toggle_tag("Horror");
        assert_eq!(names(&idx, "", &f), vec!["A"]);
    }

    #[test]
    fn price_sorts_are_stable() {
        let idx = index(vec![
            book("A", "x", 30.0, None, &[], None),
            book("B", "x", 10.0, None, &[], None),
            book("C", "x", 50.0, Some(30.0), &[], None),
            book("D", "x", 10.0, None, &[], None),
        ]);
        let asc = SearchFilters { sort_by: SortBy::PriceAsc, ..SearchFilters::default() };
        assert_eq!(names(&idx, "", &asc), vec!["B", "D", "A", "C"]);
        let desc = SearchFilters { sort_by: SortBy::PriceDesc, ..SearchFilters::default() };
        assert_eq!(names(&idx, "", &desc), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn debug_counts_follow_stages() {
        let idx = index(vec![
            book("A", "x", 10.0, None, &["Drama"], Some(100)),
            book("B", "x", 2000.0, None, &["Drama"], Some(100)),
            book("C", "x", 10.0, None, &["Poetry"], Some(100)),
        ]);
        let mut f = SearchFilters::default();
        f.toggle_tag("Drama");
        let (hits, dbg) = idx.search_with_debug("", &f);
        assert_eq!(hits.len(), 1);
        assert_eq!(dbg, SearchDebugInfo { total: 3, after_text: 3, after_tags: 2, after_price: 1, after_pages: 1, after_discount: 1 });
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let idx = index(Vec::new());
        assert!(idx.search("anything", &SearchFilters::default()).is_empty());
        assert!(idx.search("", &SearchFilters::default()).is_empty());
    }

    #[test]
    fn one_shot_search_shares_the_catalog() {
        let catalog = Arc::new(Catalog::new(vec![
            book("Emma", "Jane Austen", 300.0, None, &["Classics"], Some(474)),
            book("Solaris", "Stanislaw Lem", 250.0, Some(200.0), &["Science Fiction"], Some(204)),
        ]).unwrap());
        let found = search_books(&catalog, "lem", &SearchFilters::default());
        assert_eq!(found.len(), 1);
        assert!(std::ptr::eq(found[0], &catalog.books()[1]));
        assert_eq!(Arc::strong_count(&catalog), 1);
    }
}
