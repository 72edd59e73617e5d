use std::sync::LazyLock;

use regex::Regex;

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").unwrap());
static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(t[dh])\b[^>]*>(.*?)</t[dh]\s*>").unwrap());

/// How to find the table(s) holding the records of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Every `<table>` on the page; rows have exactly two cells.
    AllTables,
    /// The one table with this `id`; rows have three or more cells.
    /// Falls back to the whole document when the table is missing.
    NamedTable(String),
}

impl Locator {
    fn accepts(&self, cell_count: usize) -> bool {
        match self {
            Locator::AllTables => cell_count == 2,
            Locator::NamedTable(_) => cell_count >= 3,
        }
    }
}

/// One `<tr>` split into the raw markup of its `<td>`/`<th>` cells.
#[derive(Debug, Clone)]
pub struct RawRow<'a> {
    pub cells: Vec<&'a str>,
    /// Every cell was a `<th>`.
    pub header: bool,
}

impl<'a> RawRow<'a> {
    pub fn name_cell(&self) -> &'a str {
        self.cells[0]
    }

    pub fn rest(&self) -> &[&'a str] {
        &self.cells[1..]
    }
}

/// Table bodies the locator selects, in document order.
pub fn table_bodies<'a>(html: &'a str, locator: &Locator) -> Vec<&'a str> {
    match locator {
        Locator::AllTables => TABLE_RE
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect(),
        Locator::NamedTable(id) => vec![named_table(html, id).unwrap_or(html)],
    }
}

fn named_table<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let id = regex::escape(id);
    let pattern = format!(
        r#"(?is)<table\b[^>]*?\sid\s*=\s*(?:"{id}"|'{id}'|{id})(?:[\s/][^>]*)?>(.*?)</table\s*>"#
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Rows whose cell count fits the locator. `<th>` counts as a cell, so a
/// `<th scope="row">` name cell stays first.
pub fn rows<'a>(body: &'a str, locator: &Locator) -> Vec<RawRow<'a>> {
    ROW_RE
        .captures_iter(body)
        .filter_map(|row| {
            let inner = row.get(1)?.as_str();
            let mut header = true;
            let mut cells = Vec::new();
            for cell in CELL_RE.captures_iter(inner) {
                header &= cell[1].eq_ignore_ascii_case("th");
                if let Some(m) = cell.get(2) {
                    cells.push(m.as_str());
                }
            }
            locator
                .accepts(cells.len())
                .then_some(RawRow { cells, header })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tables_in_order() {
        let html = "<p>x</p><table><tr><td>a</td></tr></table><TABLE class=\"t\">b</TABLE>";
        let bodies = table_bodies(html, &Locator::AllTables);
        assert_eq!(bodies, vec!["<tr><td>a</td></tr>", "b"]);
    }

    #[test]
    fn no_tables_yields_nothing() {
        assert!(table_bodies("<div>nothing</div>", &Locator::AllTables).is_empty());
    }

    #[test]
    fn named_table_by_id() {
        let html = r#"<table id="other"><tr>1</tr></table><table class="x" id="rankings"><tr>2</tr></table>"#;
        let bodies = table_bodies(html, &Locator::NamedTable("rankings".into()));
        assert_eq!(bodies, vec!["<tr>2</tr>"]);

        let html = "<table id='rankings' data-sort=\"1\"><tr>3</tr></table>";
        let bodies = table_bodies(html, &Locator::NamedTable("rankings".into()));
        assert_eq!(bodies, vec!["<tr>3</tr>"]);
    }

    #[test]
    fn named_table_id_prefix_does_not_match() {
        let html = r#"<table id="rankings-old"><tr>1</tr></table>"#;
        let bodies = table_bodies(html, &Locator::NamedTable("rankings".into()));
        assert_eq!(bodies, vec![html]);
    }

    #[test]
    fn missing_named_table_falls_back_to_document() {
        let html = "<div><tr><td>a</td><td>b</td><td>c</td></tr></div>";
        let locator = Locator::NamedTable("rankings".into());
        let bodies = table_bodies(html, &locator);
        assert_eq!(bodies, vec![html]);
        assert_eq!(rows(bodies[0], &locator).len(), 1);
    }

    #[test]
    fn cell_count_filter() {
        let body = "<tr><th>School Name</th><th>Score</th></tr>\
                    <tr><td>A</td><td>1</td></tr>\
                    <tr><td>B</td><td>2</td><td>3</td></tr>";
        let two = rows(body, &Locator::AllTables);
        assert_eq!(two.len(), 2);
        assert!(two[0].header);
        assert_eq!(two[1].name_cell(), "A");
        assert!(!two[1].header);

        let three = rows(body, &Locator::NamedTable("t".into()));
        assert_eq!(three.len(), 1);
        assert_eq!(three[0].name_cell(), "B");
        assert_eq!(three[0].rest(), &["2", "3"]);
    }

    #[test]
    fn th_name_cell_stays_first() {
        let body = r#"<tr><th scope="row"><a href="/p/acme">Acme</a></th><td>1</td><td>2</td><td>3</td></tr>"#;
        let r = rows(body, &Locator::NamedTable("t".into()));
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].name_cell(), r#"<a href="/p/acme">Acme</a>"#);
        assert_eq!(r[0].rest(), &["1", "2", "3"]);
        assert!(!r[0].header);
    }

    #[test]
    fn cells_keep_inner_markup() {
        let body = "<tr class=\"r\">\n  <td class=\"n\"><a href=\"/x\">Acme</a></td>\n  <td>ignored</td>\n</tr>";
        let r = rows(body, &Locator::AllTables);
        assert_eq!(r[0].cells, vec!["<a href=\"/x\">Acme</a>", "ignored"]);
    }
}
