#![forbid(unsafe_code)]

use std::sync::Arc;

use proptest::prelude::*;
use shelf_core::Catalog;
use shelf_search::{decode, encode, Index, SearchFilters, SortBy};

fn bundled_index() -> Index {
    Index::build(Arc::new(Catalog::bundled().expect("bundled catalog")))
}

fn sort_by() -> impl Strategy<Value = SortBy> {
    prop_oneof![Just(SortBy::Relevance), Just(SortBy::PriceAsc), Just(SortBy::PriceDesc)]
}

fn discount(allow_false: bool) -> BoxedStrategy<Option<bool>> {
    if allow_false {
        prop_oneof![Just(None), Just(Some(true)), Just(Some(false))].boxed()
    } else {
        prop_oneof![Just(None), Just(Some(true))].boxed()
    }
}

/// Valid filter sets: non-negative, ordered bounds, comma-free tag names.
fn filters(allow_false: bool) -> impl Strategy<Value = SearchFilters> {
    (
        prop::collection::btree_set("[A-Za-z][A-Za-z ]{0,10}", 0..4),
        0u32..150_000,
        0u32..150_000,
        0u32..600,
        0u32..600,
        discount(allow_false),
        sort_by(),
    )
        .prop_map(|(tags, min_cents, span_cents, pages_min, pages_span, discount, sort_by)| {
            let price_min = f64::from(min_cents) / 100.0;
            SearchFilters {
                tags,
                price_min,
                price_max: price_min + f64::from(span_cents) / 100.0,
                pages_min,
                pages_max: pages_min + pages_span,
                discount,
                sort_by,
            }
        })
}

fn catalog_filters() -> impl Strategy<Value = SearchFilters> {
    let tags: Vec<String> = shelf_search::TagIndex::build(&Catalog::bundled().expect("bundled catalog")).all().to_vec();
    (
        prop::sample::subsequence(tags, 0..3),
        0u32..1200,
        0u32..1200,
        0u32..600,
        0u32..600,
        discount(true),
        sort_by(),
    )
        .prop_map(|(tags, a, b, c, d, discount, sort_by)| SearchFilters {
            tags: tags.into_iter().collect(),
            price_min: f64::from(a.min(b)),
            price_max: f64::from(a.max(b)),
            pages_min: c.min(d),
            pages_max: c.max(d),
            discount,
            sort_by,
        })
}

fn query() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just("tolstoy".to_string()), "[a-z]{1,6}"]
}

#[derive(Debug, Clone)]
enum Edit {
    PriceMin(f64),
    PriceMax(f64),
    PagesMin(u32),
    PagesMax(u32),
    ClearPriceMin,
    ClearPriceMax,
    ClearPagesMin,
    ClearPagesMax,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (-100.0f64..3000.0).prop_map(Edit::PriceMin),
        (-100.0f64..3000.0).prop_map(Edit::PriceMax),
        (0u32..2000).prop_map(Edit::PagesMin),
        (0u32..2000).prop_map(Edit::PagesMax),
        Just(Edit::ClearPriceMin),
        Just(Edit::ClearPriceMax),
        Just(Edit::ClearPagesMin),
        Just(Edit::ClearPagesMax),
    ]
}

proptest! {
    #[test]
    fn decode_inverts_encode(f in filters(false)) {
        prop_assert_eq!(decode(&encode(&f)), f);
    }

    #[test]
    fn canonical_form_is_idempotent(f in filters(true)) {
        let once = encode(&f);
        prop_assert_eq!(encode(&decode(&once)), once);
    }

    #[test]
    fn query_string_round_trip(f in filters(false)) {
        let wire = encode(&f).to_query_string();
        prop_assert_eq!(decode(&shelf_search::Params::parse_query_string(&wire)), f);
    }

    #[test]
    fn bounds_stay_ordered_after_every_edit(edits in prop::collection::vec(edit(), 0..40)) {
        let mut f = SearchFilters::default();
        for e in edits {
            match e {
                Edit::PriceMin(v) => f.set_price_min(v),
                Edit::PriceMax(v) => f.set_price_max(v),
                Edit::PagesMin(v) => f.set_pages_min(v),
                Edit::PagesMax(v) => f.set_pages_max(v),
                Edit::ClearPriceMin => f.clear_price_min(),
                Edit::ClearPriceMax => f.clear_price_max(),
                Edit::ClearPagesMin => f.clear_pages_min(),
                Edit::ClearPagesMax => f.clear_pages_max(),
            }
            prop_assert!(f.price_min >= 0.0);
            prop_assert!(f.price_min <= f.price_max, "{} > {}", f.price_min, f.price_max);
            prop_assert!(f.pages_min <= f.pages_max);
        }
    }

    #[test]
    fn narrowing_price_never_grows_results(q in query(), f in catalog_filters(), lo in 0.0f64..1.0, hi in 0.0f64..1.0) {
        let idx = bundled_index();
        let wide = idx.search(&q, &f).len();
        let span = f.price_max - f.price_min;
        let (a, b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let narrow = SearchFilters { price_min: f.price_min + span * a, price_max: f.price_min + span * b, ..f.clone() };
        prop_assert!(idx.search(&q, &narrow).len() <= wide);
    }

    #[test]
    fn narrowing_pages_never_grows_results(q in query(), f in catalog_filters(), lo in 0u32..=100, hi in 0u32..=100) {
        let idx = bundled_index();
        let wide = idx.search(&q, &f).len();
        let span = f.pages_max - f.pages_min;
        let (a, b) = (lo.min(hi), lo.max(hi));
        let narrow = SearchFilters {
            pages_min: f.pages_min + span * a / 100,
            pages_max: f.pages_min + span * b / 100,
            ..f.clone()
        };
        prop_assert!(narrow.pages_min >= f.pages_min && narrow.pages_max <= f.pages_max);
        prop_assert!(idx.search(&q, &narrow).len() <= wide);
    }

    #[test]
    fn enabling_tag_filter_never_grows_results(q in query(), f in catalog_filters(), tag in "[A-Za-z ]{1,12}") {
        let idx = bundled_index();
        let base = SearchFilters { tags: Default::default(), ..f };
        let mut tagged = base.clone();
        tagged.toggle_tag(&tag);
        prop_assert!(idx.search(&q, &tagged).len() <= idx.search(&q, &base).len());
    }

    #[test]
    fn price_sorts_are_ordered(q in query(), f in catalog_filters()) {
        let idx = bundled_index();
        let asc = SearchFilters { sort_by: SortBy::PriceAsc, ..f.clone() };
        let prices: Vec<f64> = idx.search_books(&q, &asc).iter().map(|b| b.effective_price()).collect();
        prop_assert!(prices.windows(2).all(|w| w[0] <= w[1]));
        let desc = SearchFilters { sort_by: SortBy::PriceDesc, ..f };
        let prices: Vec<f64> = idx.search_books(&q, &desc).iter().map(|b| b.effective_price()).collect();
        prop_assert!(prices.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn every_result_satisfies_filters(q in query(), f in catalog_filters()) {
        let idx = bundled_index();
        for b in idx.search_books(&q, &f) {
            prop_assert!(f.matches(b), "{} slipped through", b.name);
        }
    }
}

#[test]
fn shakespeare_misspelling_on_bundled_catalog() {
    let idx = bundled_index();
    let books = idx.search_books("Shakespere", &SearchFilters::default());
    assert!(!books.is_empty());
    assert!(books.iter().all(|b| b.author == "William Shakespeare"));
}
