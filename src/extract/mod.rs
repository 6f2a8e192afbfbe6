// src/extract/mod.rs
//! HTML → [`RawTable`] extraction.
//!
//! Deliberately dumb: walk every `tr` of every table matching the
//! caller's selector, take `th`/`td` text in document order, trim it, and
//! let the first row be the header. All interpretation of the cells is
//! the normalizer's job.

use crate::error::{ScrapeError, ScrapeResult};
use crate::normalize::types::RawTable;
use scraper::{Html, Selector};

/// Extract every table matching `selector`, in document order. Tables
/// with no rows at all are dropped.
pub fn extract_tables(html: &str, selector: &str) -> ScrapeResult<Vec<RawTable>> {
    let table_selector =
        Selector::parse(selector).map_err(|_| ScrapeError::BadSelector(selector.to_string()))?;
    let row_selector = Selector::parse("tr").expect("row selector should be valid");
    let cell_selector = Selector::parse("th, td").expect("cell selector should be valid");

    let doc = Html::parse_document(html);
    let mut tables = Vec::new();

    for table in doc.select(&table_selector) {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in table.select(&row_selector) {
            rows.push(
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_string())
                    .collect(),
            );
        }

        if let Some((header, body)) = rows.split_first() {
            tables.push(RawTable {
                header: header.clone(),
                rows: body.to_vec(),
            });
        }
    }

    Ok(tables)
}
