// src/sources/mod.rs
//! Source descriptors: which pages to scrape and what is statically
//! known about each. The built-in set covers the fixed endpoints; a JSON
//! file with the same shape can replace it without a rebuild.

use crate::error::ScrapeResult;
use crate::normalize::types::Election;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a page arranges its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLayout {
    /// Date labels as rows, one party per column (pollofpolls).
    DateRows,
    /// Parties as rows, months as columns; one table per year, most
    /// recent first (the infact archive page).
    MonthGrid { years: Vec<i32> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub url: String,
    /// Publisher name stored on every record.
    pub source: String,
    pub region: String,
    /// `None` for tracking series whose election is inferred per date.
    #[serde(default)]
    pub election: Option<Election>,
    pub layout: TableLayout,
    #[serde(default = "default_selector")]
    pub selector: String,
}

fn default_selector() -> String {
    "#content table".to_string()
}

/// The endpoints the scraper has always covered.
pub fn default_sources() -> Vec<SourceSpec> {
    let pop = |url: &str, election: Election, region: &str| SourceSpec {
        url: url.to_string(),
        source: "pollofpolls.no".to_string(),
        region: region.to_string(),
        election: Some(election),
        layout: TableLayout::DateRows,
        selector: default_selector(),
    };

    vec![
        pop(
            "http://www.pollofpolls.no/?cmd=Kommunestyre&do=vispopalle",
            Election::Municipality,
            "Norge",
        ),
        pop(
            "http://www.pollofpolls.no/?cmd=Kommunestyre&do=vispopalle&landsdelid=0",
            Election::Municipality,
            "Oslo/Akershus",
        ),
        pop(
            "http://www.pollofpolls.no/?cmd=Fylkesting&do=vispopalle",
            Election::County,
            "Norge",
        ),
        pop(
            "http://www.pollofpolls.no/?cmd=Stortinget&do=vispopalle",
            Election::Parliament,
            "Norge",
        ),
        SourceSpec {
            url: "http://infact.no/about/arkivoversikt-partibarometer".to_string(),
            source: "InFact".to_string(),
            region: "Norge".to_string(),
            election: None,
            layout: TableLayout::MonthGrid {
                years: vec![2015, 2014, 2013, 2012, 2011, 2010, 2009],
            },
            selector: default_selector(),
        },
    ]
}

/// Read a source list from a JSON file.
pub fn load_sources(path: &Path) -> ScrapeResult<Vec<SourceSpec>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_the_fixed_endpoints() {
        let sources = default_sources();
        assert_eq!(sources.len(), 5);
        assert!(sources
            .iter()
            .all(|s| s.selector == "#content table"));

        let infact = sources.last().unwrap();
        assert_eq!(infact.election, None);
        match &infact.layout {
            TableLayout::MonthGrid { years } => {
                assert_eq!(years.first(), Some(&2015));
                assert_eq!(years.last(), Some(&2009));
            }
            other => panic!("unexpected layout: {other:?}"),
        }
    }

    #[test]
    fn sources_round_trip_through_json() {
        let sources = default_sources();
        let json = serde_json::to_string(&sources).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = load_sources(file.path()).unwrap();
        assert_eq!(loaded, sources);
    }

    #[test]
    fn missing_election_defaults_to_inference() {
        let json = r#"[{
            "url": "http://example.org/polls",
            "source": "example",
            "region": "Norge",
            "layout": "date_rows"
        }]"#;
        let sources: Vec<SourceSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(sources[0].election, None);
        assert_eq!(sources[0].selector, "#content table");
    }
}
