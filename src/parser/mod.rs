pub mod markup;
pub mod rows;
pub mod website;

use std::sync::LazyLock;

use regex::Regex;

pub use rows::Locator;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))[^>]*>(.*?)</a\s*>"#)
        .unwrap()
});

/// Labels that mark a header row misfiled as data.
const HEADER_LABELS: &[&str] = &["school name", "school", "institution", "institution name", "name"];

/// One unverified name/website pair pulled from a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub website: String,
}

/// Candidates from one document plus the number of matched rows dropped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub candidates: Vec<Candidate>,
    pub skipped: usize,
}

/// Table bodies → rows → candidates, in document order.
pub fn extract(html: &str, locator: &Locator, origin: &str) -> Extraction {
    let mut out = Extraction::default();
    for body in rows::table_bodies(html, locator) {
        for row in rows::rows(body, locator) {
            match candidate(&row, locator, origin) {
                Some(c) => out.candidates.push(c),
                None => out.skipped += 1,
            }
        }
    }
    out
}

fn candidate(row: &rows::RawRow<'_>, locator: &Locator, origin: &str) -> Option<Candidate> {
    if row.header {
        return None;
    }
    let cell = row.name_cell();
    let (name, website) = match ANCHOR_RE.captures(cell) {
        Some(caps) => {
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let inner = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
            let href = markup::decode_entities(href);
            (markup::clean_text(inner), website::normalize(&href, origin))
        }
        None => {
            let website = match locator {
                Locator::NamedTable(_) => row
                    .rest()
                    .iter()
                    .find_map(|c| website::scan(c, origin))
                    .unwrap_or_default(),
                Locator::AllTables => String::new(),
            };
            (markup::clean_text(cell), website)
        }
    };

    if name.is_empty() || is_header_label(&name) {
        return None;
    }
    Some(Candidate { name, website })
}

fn is_header_label(name: &str) -> bool {
    HEADER_LABELS.iter().any(|l| name.eq_ignore_ascii_case(l))
}
