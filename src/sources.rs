use url::Url;

use crate::parser::Locator;

/// One page fetched independently during an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Reported back in the error list (category token or page URL).
    pub id: String,
    pub url: String,
    /// scheme://host[:port] of `url`, base for `/`-relative links.
    pub origin: String,
    pub locator: Locator,
}

impl Source {
    pub fn new(id: impl Into<String>, url: impl Into<String>, locator: Locator) -> Self {
        let url = url.into();
        let origin = origin_of(&url);
        Source {
            id: id.into(),
            url,
            origin,
            locator,
        }
    }
}

fn origin_of(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.origin().ascii_serialization())
        .ok()
        .filter(|o| o != "null")
        .unwrap_or_else(|| url.to_string())
}

/// Multi-category ranking site, one named-table page per category and year.
#[derive(Debug, Clone)]
pub struct RankingSources {
    /// Contains `{year}` and `{category}` placeholders.
    pub url_template: String,
    pub categories: Vec<String>,
    pub table_id: String,
}

impl RankingSources {
    pub fn for_year(&self, year: &str) -> Vec<Source> {
        self.categories
            .iter()
            .map(|category| {
                let url = self
                    .url_template
                    .replace("{year}", year)
                    .replace("{category}", category);
                Source::new(category.as_str(), url, Locator::NamedTable(self.table_id.clone()))
            })
            .collect()
    }
}

/// Single-page directory site scanned in all-tables mode.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub url: String,
}

impl DirectorySource {
    pub fn source(&self) -> Source {
        Source::new(self.url.as_str(), self.url.as_str(), Locator::AllTables)
    }
}

/// Query value → year actually used; anything but digits falls back.
pub fn resolve_year(requested: Option<&str>, default_year: &str) -> String {
    match requested.map(str::trim) {
        Some(y) if !y.is_empty() && y.chars().all(|c| c.is_ascii_digit()) => y.to_string(),
        _ => default_year.to_string(),
    }
}
