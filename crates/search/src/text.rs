//! Approximate text stage over `name` and `author`.
//!
//! Each field is scored by its best approximate substring alignment against the
//! query: `errors / query_len + start / LOCATION_DISTANCE`. Lower is better and
//! `0` is an exact field match. A field counts as matched at or below `THRESHOLD`.

#![forbid(unsafe_code)]

/// Roughly 30% of the query may be edited before a field stops matching.
pub const THRESHOLD: f64 = 0.3;
/// A match starting this many characters into the field costs one full error-ratio point.
const LOCATION_DISTANCE: f64 = 100.0;
const FIELD_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone)]
pub(crate) struct TextField {
    chars: Vec<char>,
    norm: f64,
}

impl TextField {
    pub(crate) fn new(raw: &str) -> Self {
        let words = raw.split_whitespace().count().max(1) as f64;
        Self { chars: raw.to_lowercase().chars().collect(), norm: 1.0 / words.sqrt() }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TextEntry {
    pub(crate) name: TextField,
    pub(crate) author: TextField,
}

/// Lower-cased query ready for repeated matching.
pub(crate) fn prepare(query: &str) -> Vec<char> { query.trim().to_lowercase().chars().collect() }

/// Combined score for a book, `None` when neither field matches.
pub(crate) fn score_entry(pattern: &[char], e: &TextEntry) -> Option<f64> {
    let mut total = 1.0f64;
    let mut matched = false;
    for field in [&e.name, &e.author] {
        if let Some(s) = field_score(pattern, &field.chars) {
            matched = true;
            let base = if s == 0.0 { f64::EPSILON } else { s };
            total *= base.powf(FIELD_WEIGHT * field.norm);
        }
    }
    matched.then_some(total)
}

/// Best `errors / m + start / distance` over all alignments of `pattern` inside `text`.
pub(crate) fn field_score(pattern: &[char], text: &[char]) -> Option<f64> {
    let m = pattern.len();
    if m == 0 { return None; }
    if pattern == text { return Some(0.0); }

    // Semi-global edit distance: leading and trailing text is free.
    // cost[i] / start[i]: best alignment of pattern[..i] ending at the current text column.
    let mut cost: Vec<usize> = (0..=m).collect();
    let mut start: Vec<usize> = vec![0; m + 1];
    let mut next_cost = vec![0usize; m + 1];
    let mut next_start = vec![0usize; m + 1];
    let mut best: Option<f64> = None;

    for (j, &tc) in text.iter().enumerate() {
        next_cost[0] = 0;
        next_start[0] = j + 1;
        for i in 1..=m {
            let sub = cost[i - 1] + usize::from(pattern[i - 1] != tc);
            let mut c = sub;
            let mut s = start[i - 1];
            let del = next_cost[i - 1] + 1;
            if del < c || (del == c && next_start[i - 1] < s) { c = del; s = next_start[i - 1]; }
            let ins = cost[i] + 1;
            if ins < c || (ins == c && start[i] < s) { c = ins; s = start[i]; }
            next_cost[i] = c;
            next_start[i] = s;
        }
        std::mem::swap(&mut cost, &mut next_cost);
        std::mem::swap(&mut start, &mut next_start);

        let score = cost[m] as f64 / m as f64 + start[m] as f64 / LOCATION_DISTANCE;
        if score <= THRESHOLD && best.map(|b| score < b).unwrap_or(true) {
            best = Some(score);
        }
    }
    best
}
