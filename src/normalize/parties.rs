//! Raw party labels → canonical party codes.
//!
//! The sources spell party names inconsistently across years ("Krf" vs
//! "KrF", "Andre" vs "Andre partier"), so lookups go through an alias
//! table. A label missing from the table is always a hard error: a
//! mislabeled column would store figures under the wrong party, which is
//! worse than aborting the run.

use crate::error::{ScrapeError, ScrapeResult};
use std::collections::HashMap;

/// Spelling variants observed in the wild, mapped to the code the record
/// is stored under.
static DEFAULT_PARTIES: &[(&str, &str)] = &[
    ("Ap", "A"),
    ("Høyre", "H"),
    ("H", "H"),
    ("Venstre", "V"),
    ("V", "V"),
    ("Krf", "KrF"),
    ("KrF", "KrF"),
    ("Frp", "FrP"),
    ("Rødt", "R"),
    ("MDG", "MDG"),
    ("SV", "SV"),
    ("Sp", "Sp"),
    ("Andre", "Andre"),
    ("Andre partier", "Andre"),
];

#[derive(Debug, Clone)]
pub struct PartyResolver {
    map: HashMap<String, String>,
}

impl Default for PartyResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_PARTIES
                .iter()
                .map(|(raw, code)| (raw.to_string(), code.to_string())),
        )
    }
}

impl PartyResolver {
    pub fn new(mapping: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            map: mapping.into_iter().collect(),
        }
    }

    /// Look up the canonical code for a raw header label.
    pub fn resolve(&self, raw: &str) -> ScrapeResult<&str> {
        self.map
            .get(raw)
            .map(String::as_str)
            .ok_or_else(|| ScrapeError::UnknownParty(raw.to_string()))
    }

    /// Every canonical code, deduplicated, in a stable order. This is the
    /// party ordering per-party-column schemas are built with.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.map.values().cloned().collect();
        codes.sort();
        codes.dedup();
        codes
    }
}
