use std::collections::HashMap;

use serde::Serialize;

use crate::parser::Candidate;

/// Dedup key for a display name: lower-cased, whitespace collapsed.
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedEntry {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub website: String,
}

/// Folds candidates into one entry per key, keeping first-seen order.
///
/// The first name seen for a key is kept for good; the website is filled in
/// by the first candidate that has one and never changes after that.
#[derive(Debug, Default)]
pub struct Merger {
    index: HashMap<String, usize>,
    entries: Vec<MergedEntry>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: Candidate) {
        let key = normalize_key(&candidate.name);
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                if entry.website.is_empty() && !candidate.website.is_empty() {
                    entry.website = candidate.website;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(MergedEntry {
                    name: candidate.name,
                    website: candidate.website,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<MergedEntry> {
        self.entries
    }
}

impl Extend<Candidate> for Merger {
    fn extend<I: IntoIterator<Item = Candidate>>(&mut self, iter: I) {
        for c in iter {
            self.push(c);
        }
    }
}
