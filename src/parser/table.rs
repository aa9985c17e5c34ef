use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Place your").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Outcome of locating the listing table in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// One raw text block per entity, in document order.
    Blocks(Vec<String>),
    /// The page did not have the expected layout.
    Missing(Mismatch),
}

/// Which step of the table lookup came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    NoAnchor,
    NoEnclosingTable,
    NoSiblingTable,
    NoRow,
    NoCell,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Mismatch::NoAnchor => "no \"Place your\" banner text",
            Mismatch::NoEnclosingTable => "banner text is not inside a table",
            Mismatch::NoSiblingTable => "no table follows the banner table",
            Mismatch::NoRow => "listing table has no rows",
            Mismatch::NoCell => "first listing row has no cells",
        };
        f.write_str(msg)
    }
}

/// Locate the listing cell and split its text into per-entity blocks.
///
/// The listing pages put an advertising banner ("Place your ad here") in its
/// own table directly before the listing table. All entries are packed into the
/// first cell of that listing table, separated by blank lines.
pub fn extract_blocks(html: &str) -> Extraction {
    let document = Html::parse_document(html);
    match listing_cell_text(&document) {
        Ok(text) => Extraction::Blocks(split_blocks(&text)),
        Err(m) => Extraction::Missing(m),
    }
}

fn listing_cell_text(document: &Html) -> Result<String, Mismatch> {
    let anchor = document
        .root_element()
        .descendants()
        .find(|node| {
            node.value()
                .as_text()
                .is_some_and(|t| ANCHOR_RE.is_match(t))
        })
        .ok_or(Mismatch::NoAnchor)?;

    let banner_table = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .ok_or(Mismatch::NoEnclosingTable)?;

    let listing_table = banner_table
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .ok_or(Mismatch::NoSiblingTable)?;

    let row = listing_table.select(&ROW_SEL).next().ok_or(Mismatch::NoRow)?;
    let cell = row.select(&CELL_SEL).next().ok_or(Mismatch::NoCell)?;

    Ok(cell.text().collect())
}

/// Trim every line, then cut on blank lines.
pub fn split_blocks(raw: &str) -> Vec<String> {
    let cleaned = raw
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    cleaned.split("\n\n").map(str::to_string).collect()
}
