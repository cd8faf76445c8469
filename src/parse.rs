use std::fmt;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::MarkerPolicy;
use crate::{
    warn_time, Error, Result, CATEGORY_HREF_PATTERN, IDENTIFIER_HREF_PATTERN, IDENTIFIER_MARKER,
};

/// How the target `<table>` is picked out of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMatcher {
    /// The n-th table in document order, 0-based.
    Nth(usize),
    /// The table whose `id` attribute is equal to the value.
    Id(String),
    /// The table whose own `<caption>` text, trimmed, is equal to the value.
    Caption(String),
}

impl Default for TableMatcher {
    /// The association list is the second table on the page.
    fn default() -> Self {
        TableMatcher::Nth(1)
    }
}

impl fmt::Display for TableMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableMatcher::Nth(n) => write!(f, "table #{n}"),
            TableMatcher::Id(id) => write!(f, "table[id=\"{id}\"]"),
            TableMatcher::Caption(caption) => write!(f, "table with caption \"{caption}\""),
        }
    }
}

/// Header and data cells of one HTML table, as text, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses the page and pulls the table picked by `matcher` apart.
/// The first `<tr>` gives the header (its `<th>` cells), every other `<tr>` a data row (its `<td>` cells).
pub fn extract_table(html: &str, matcher: &TableMatcher) -> Result<ScrapedTable> {
    let doc = Html::parse_document(html);
    let table = select_table(&doc, matcher)?;

    let row_selector = create_selector("tr")?;
    let header_selector = create_selector("th")?;
    let cell_selector = create_selector("td")?;

    let mut rows = table.select(&row_selector);
    let header_row = rows.next().ok_or(Error::EmptyTable)?;
    let header = header_row.select(&header_selector).map(cell_text).collect();
    let rows = rows
        .map(|row| row.select(&cell_selector).map(cell_text).collect::<Vec<_>>())
        .collect();

    Ok(ScrapedTable { header, rows })
}

fn select_table<'a>(doc: &'a Html, matcher: &TableMatcher) -> Result<ElementRef<'a>> {
    let table_selector = create_selector("table")?;
    let mut tables = doc.select(&table_selector);

    let candidates: Vec<ElementRef<'a>> = match matcher {
        TableMatcher::Nth(n) => {
            return tables
                .nth(*n)
                .ok_or_else(|| Error::TableNotFound(matcher.to_string()));
        }
        TableMatcher::Id(id) => tables
            .filter(|table| table.value().id() == Some(id.as_str()))
            .collect(),
        TableMatcher::Caption(caption) => tables
            .filter(|table| {
                own_caption(*table).is_some_and(|text| text.trim() == caption.trim())
            })
            .collect(),
    };

    match candidates.as_slice() {
        [] => Err(Error::TableNotFound(matcher.to_string())),
        [table] => Ok(*table),
        _ => Err(Error::AmbiguousTable {
            matcher: matcher.to_string(),
            count: candidates.len(),
        }),
    }
}

/// Caption text of the table itself, ignoring captions of nested tables.
fn own_caption(table: ElementRef) -> Option<String> {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "caption")
        .map(cell_text)
}

/// Finds the category links on the class overview page and turns them into absolute URLs.
/// Leading `.` and `/` characters of the relative link are dropped before `base_url` is prepended.
pub fn category_links(html: &str, base_url: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let pattern = Regex::new(CATEGORY_HREF_PATTERN)?;

    let links = matching_hrefs(&doc, &pattern)?
        .into_iter()
        .map(|href| format!("{base_url}{}", href.trim_start_matches(['.', '/'])))
        .collect();
    Ok(links)
}

/// Collects the identifier tokens linked from one category page, in document order.
pub fn identifier_tokens(html: &str, on_missing: MarkerPolicy) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let pattern = Regex::new(IDENTIFIER_HREF_PATTERN)?;

    let mut tokens = Vec::new();
    for href in matching_hrefs(&doc, &pattern)? {
        match split_after(&href, IDENTIFIER_MARKER) {
            Some(token) => tokens.push(token.to_string()),
            None => {
                let err = Error::MissingMarker {
                    marker: IDENTIFIER_MARKER,
                    url: href,
                };
                match on_missing {
                    MarkerPolicy::Fail => return Err(err),
                    MarkerPolicy::Skip => warn_time!("skipping identifier link: {}", err),
                }
            }
        }
    }
    Ok(tokens)
}

/// The piece of `s` between the first `marker` and the next one (or the end).
#[inline]
pub(crate) fn split_after<'a>(s: &'a str, marker: &str) -> Option<&'a str> {
    s.split(marker).nth(1)
}

fn matching_hrefs(doc: &Html, pattern: &Regex) -> Result<Vec<String>> {
    let anchor_selector = create_selector("a[href]")?;
    let hrefs = doc
        .select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| pattern.is_match(href))
        .map(str::to_string)
        .collect();
    Ok(hrefs)
}

#[inline]
fn cell_text(el: ElementRef) -> String {
    el.text().collect()
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TABLES: &str = r#"
        <html><body>
          <table id="nav"><tr><th>Menu</th></tr><tr><td>Home</td></tr></table>
          <table id="assoc">
            <caption> Associations </caption>
            <tr><th>Drug</th><th>Disease</th><th>Evidence</th></tr>
            <tr><td>Aspirin</td><td>Headache</td><td>Strong</td></tr>
            <tr><td>Lithium</td><td>Bipolar disorder</td><td>Strong, replicated</td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn second_table_by_default() {
        let table = extract_table(TWO_TABLES, &TableMatcher::default()).unwrap();
        assert_eq!(table.header, vec!["Drug", "Disease", "Evidence"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Aspirin", "Headache", "Strong"],
                vec!["Lithium", "Bipolar disorder", "Strong, replicated"],
            ]
        );
    }

    #[test]
    fn rows_keep_shape_and_order() {
        let table = extract_table(TWO_TABLES, &TableMatcher::Nth(1)).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|row| row.len() == table.header.len()));
        assert_eq!(table.rows[0][0], "Aspirin");
        assert_eq!(table.rows[1][0], "Lithium");
    }

    #[test]
    fn cell_text_is_not_trimmed() {
        let html = "<table></table><table><tr><th> A </th></tr><tr><td>x <b>y</b></td></tr></table>";
        let table = extract_table(html, &TableMatcher::default()).unwrap();
        assert_eq!(table.header, vec![" A "]);
        assert_eq!(table.rows, vec![vec!["x y"]]);
    }

    #[test]
    fn missing_second_table_fails() {
        let html = "<table><tr><th>Only</th></tr><tr><td>one</td></tr></table>";
        let err = extract_table(html, &TableMatcher::default()).unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[test]
    fn table_without_rows_fails() {
        let html = "<table></table><table></table>";
        let err = extract_table(html, &TableMatcher::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyTable));
    }

    #[test]
    fn select_by_id_and_caption() {
        let by_id = extract_table(TWO_TABLES, &TableMatcher::Id("assoc".into())).unwrap();
        let by_caption =
            extract_table(TWO_TABLES, &TableMatcher::Caption("Associations".into())).unwrap();
        assert_eq!(by_id, by_caption);

        let err = extract_table(TWO_TABLES, &TableMatcher::Id("nope".into())).unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[test]
    fn ambiguous_match_fails() {
        let html = r#"<table id="t"><tr><th>a</th></tr></table><table id="t"><tr><th>b</th></tr></table>"#;
        let err = extract_table(html, &TableMatcher::Id("t".into())).unwrap_err();
        assert!(matches!(err, Error::AmbiguousTable { count: 2, .. }));
    }

    #[test]
    fn category_links_are_made_absolute() {
        let html = r#"
            <a href="./index.php?site=search&Function=SubY&synapt=ClassX">x</a>
            <a href="./index.php?site=syn_class">overview</a>
            <a href="http://elsewhere.org/">other</a>
            <a href="./index.php?site=search&Function=SubZ&synapt=ClassX">z</a>
        "#;
        let links = category_links(html, "http://host/synsys/").unwrap();
        assert_eq!(
            links,
            vec![
                "http://host/synsys/index.php?site=search&Function=SubY&synapt=ClassX",
                "http://host/synsys/index.php?site=search&Function=SubZ&synapt=ClassX",
            ]
        );
    }

    #[test]
    fn identifier_tokens_in_order() {
        let html = r#"
            <a href="http://www.uniprot.org/uniprot/P12345">P12345</a>
            <a href="https://pubmed.example/123">ref</a>
            <a href="http://www.uniprot.org/uniprot/Q67890">Q67890</a>
        "#;
        let tokens = identifier_tokens(html, MarkerPolicy::Fail).unwrap();
        assert_eq!(tokens, vec!["P12345", "Q67890"]);
    }

    #[test]
    fn identifier_without_marker() {
        let html = r#"
            <a href="http://www.uniprot.org/help">help</a>
            <a href="http://www.uniprot.org/uniprot/P12345">P12345</a>
        "#;
        let err = identifier_tokens(html, MarkerPolicy::Fail).unwrap_err();
        assert!(matches!(err, Error::MissingMarker { marker: "uniprot/", .. }));

        let tokens = identifier_tokens(html, MarkerPolicy::Skip).unwrap();
        assert_eq!(tokens, vec!["P12345"]);
    }

    #[test]
    fn split_after_takes_the_second_piece() {
        assert_eq!(split_after("a=1&b=2", "b="), Some("2"));
        assert_eq!(split_after("x/uniprot/P1/uniprot/P2", "uniprot/"), Some("P1/"));
        assert_eq!(split_after("no marker", "b="), None);
    }
}
