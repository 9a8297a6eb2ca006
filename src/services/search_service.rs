//! Search Service - free-text lookup over the catalog, joined with availability

use serde::Serialize;
use strsim::jaro_winkler;

use crate::models::BookRecord;
use crate::services::availability_service::{Availability, AvailabilityEngine, AvailabilityReport};

/// Titles at least this close to the query are offered when nothing matches
const SUGGESTION_THRESHOLD: f64 = 0.88;
const MAX_SUGGESTIONS: usize = 5;

pub const STATUS_AVAILABLE: &str = "Disponível";
pub const STATUS_LOANED: &str = "Emprestado";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub code: String,
    pub title: String,
    pub author: String,
    pub total: u32,
    pub available: u32,
    pub status: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub books: Vec<SearchHit>,
    pub total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<SearchHit>,
}

fn to_hit(engine: &AvailabilityEngine, book: &BookRecord, report: &AvailabilityReport) -> SearchHit {
    let availability = report
        .get(&engine.normalize(&book.code))
        .unwrap_or(Availability {
            available: book.total_copies,
            total: book.total_copies,
            open_loans: 0,
        });
    SearchHit {
        code: book.code.clone(),
        title: book.title.clone(),
        author: book.author.clone(),
        total: availability.total,
        available: availability.available,
        status: if availability.is_available() {
            STATUS_AVAILABLE
        } else {
            STATUS_LOANED
        },
    }
}

/// Best Jaro-Winkler score of the query against the whole title or any word
fn title_similarity(folded_title: &str, query: &str) -> f64 {
    folded_title
        .split_whitespace()
        .map(|word| jaro_winkler(word, query))
        .fold(jaro_winkler(folded_title, query), f64::max)
}

/// Substring match on code, title and author, all folded the same way as
/// codes. An empty query lists the whole catalog.
pub fn search(
    engine: &AvailabilityEngine,
    catalog: &[BookRecord],
    report: &AvailabilityReport,
    query: &str,
) -> SearchResponse {
    let normalizer = engine.normalizer();
    let query = normalizer.fold_text(query);

    let mut matched: Vec<&BookRecord> = catalog
        .iter()
        .filter(|b| {
            query.is_empty()
                || normalizer.fold_text(&b.code).contains(&query)
                || normalizer.fold_text(&b.title).contains(&query)
                || normalizer.fold_text(&b.author).contains(&query)
        })
        .collect();
    matched.sort_by_key(|b| normalizer.fold_text(&b.title));

    let mut suggestions = Vec::new();
    if matched.is_empty() && !query.is_empty() {
        let mut scored: Vec<(f64, &BookRecord)> = catalog
            .iter()
            .map(|b| (title_similarity(&normalizer.fold_text(&b.title), &query), b))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        suggestions = scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, b)| to_hit(engine, b, report))
            .collect();
    }

    let books: Vec<SearchHit> = matched
        .into_iter()
        .map(|b| to_hit(engine, b, report))
        .collect();

    SearchResponse {
        total: books.len(),
        books,
        suggestions,
    }
}
