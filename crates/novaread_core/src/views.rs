//! crates/novaread_core/src/views.rs
//!
//! Derived catalog views. Each one is a pure projection over a slice of novels,
//! recomputed on every read and never stored.

use std::cmp::Ordering;

use crate::domain::Novel;
use crate::route::{SearchFilters, SortBy};

const SUGGESTION_LIMIT: usize = 5;
const RELATED_LIMIT: usize = 4;

/// Most recently updated first.
pub fn latest_novels(novels: &[Novel]) -> Vec<Novel> {
    sorted(novels, SortBy::Latest)
}

/// Most viewed first.
pub fn popular_novels(novels: &[Novel]) -> Vec<Novel> {
    sorted(novels, SortBy::Popular)
}

pub fn search_novels(novels: &[Novel], filters: &SearchFilters) -> Vec<Novel> {
    let query = filters.query.as_deref().map(str::to_lowercase);
    let mut matches: Vec<Novel> = novels
        .iter()
        .filter(|novel| query.as_deref().map_or(true, |q| matches_text(novel, q)))
        .filter(|novel| {
            filters
                .genre
                .as_deref()
                .map_or(true, |genre| contains_ignore_case(&novel.genres, genre))
        })
        .filter(|novel| {
            filters
                .tag
                .as_deref()
                .map_or(true, |tag| contains_ignore_case(&novel.tags, tag))
        })
        .filter(|novel| {
            filters
                .status
                .as_deref()
                .and_then(|status| status.parse().ok())
                .map_or(true, |status| novel.status == status)
        })
        .cloned()
        .collect();
    if let Some(sort_by) = filters.sort_by {
        matches.sort_by(|a, b| compare(a, b, sort_by));
    }
    matches
}

/// Navbar suggestions: up to five title/author matches.
pub fn suggest(novels: &[Novel], query: &str) -> Vec<Novel> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    novels
        .iter()
        .filter(|novel| matches_text(novel, &query))
        .take(SUGGESTION_LIMIT)
        .cloned()
        .collect()
}

/// Up to four other novels sharing at least one genre with `novel`.
pub fn related_novels(novels: &[Novel], novel: &Novel) -> Vec<Novel> {
    novels
        .iter()
        .filter(|other| other.id != novel.id && other.shares_genre_with(novel))
        .take(RELATED_LIMIT)
        .cloned()
        .collect()
}

fn sorted(novels: &[Novel], sort_by: SortBy) -> Vec<Novel> {
    let mut out = novels.to_vec();
    out.sort_by(|a, b| compare(a, b, sort_by));
    out
}

// Descending on the chosen key.
fn compare(a: &Novel, b: &Novel, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Latest => b.updated_at.cmp(&a.updated_at),
        SortBy::Popular => b.views.cmp(&a.views),
        SortBy::Rating => b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal),
        SortBy::Saves => b.saves.cmp(&a.saves),
        SortBy::Votes => b.all_time_votes.cmp(&a.all_time_votes),
        SortBy::Reviews => b.rating_count.cmp(&a.rating_count),
    }
}

fn matches_text(novel: &Novel, lowered_query: &str) -> bool {
    novel.title.to_lowercase().contains(lowered_query)
        || novel.author.to_lowercase().contains(lowered_query)
}

fn contains_ignore_case(values: &[String], needle: &str) -> bool {
    values.iter().any(|value| value.eq_ignore_ascii_case(needle))
}
