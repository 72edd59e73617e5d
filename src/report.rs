use serde::Serialize;

use crate::merge::{MergedEntry, Merger};

/// A source that contributed nothing because it could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub source: String,
    pub error: String,
}

/// Outcome of one run: merged entries in first-seen order, plus failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub items: Vec<MergedEntry>,
    pub errors: Vec<SourceError>,
}

impl Aggregation {
    pub fn assemble(merger: Merger, errors: Vec<SourceError>) -> Self {
        Aggregation {
            items: merger.into_entries(),
            errors,
        }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Serialize)]
pub struct DirectoryError {
    pub source: String,
    pub error: String,
}

/// Body of `GET /api/directory`.
#[derive(Debug, Serialize)]
pub struct DirectoryReport {
    pub source: String,
    pub total: usize,
    pub items: Vec<MergedEntry>,
    pub errors: Vec<DirectoryError>,
}

impl DirectoryReport {
    pub fn new(source_url: &str, agg: Aggregation) -> Self {
        DirectoryReport {
            source: source_url.to_string(),
            total: agg.total(),
            errors: agg
                .errors
                .into_iter()
                .map(|e| DirectoryError {
                    source: e.source,
                    error: e.error,
                })
                .collect(),
            items: agg.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryError {
    pub category: String,
    pub error: String,
}

/// Body of `GET /api/rankings`.
#[derive(Debug, Serialize)]
pub struct RankingsReport {
    pub year: String,
    pub total: usize,
    pub items: Vec<MergedEntry>,
    pub errors: Vec<CategoryError>,
}

impl RankingsReport {
    pub fn new(year: &str, agg: Aggregation) -> Self {
        RankingsReport {
            year: year.to_string(),
            total: agg.total(),
            errors: agg
                .errors
                .into_iter()
                .map(|e| CategoryError {
                    category: e.source,
                    error: e.error,
                })
                .collect(),
            items: agg.items,
        }
    }
}
