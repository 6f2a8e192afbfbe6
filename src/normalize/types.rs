use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column labels from the table's header row. The first entry is the
    /// row-label column (a date or a party name depending on layout); the
    /// rest are data columns.
    pub header: Vec<String>,
    /// Each body row, as a Vec of Strings (one per cell), in page order.
    pub rows: Vec<Vec<String>>,
}

/// Which election a poll series targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Election {
    Municipality,
    County,
    Parliament,
    /// pollofpolls' own cross-pollster average series.
    Snitt,
}

impl Election {
    pub fn as_str(&self) -> &'static str {
        match self {
            Election::Municipality => "municipality",
            Election::County => "county",
            Election::Parliament => "parliament",
            Election::Snitt => "snitt",
        }
    }
}

impl std::fmt::Display for Election {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The period a poll figure covers. Week and month labels carry a real
/// range; month-grid columns only pin a single publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Span { start: NaiveDate, end: NaiveDate },
    Single(NaiveDate),
}

impl DateRange {
    /// A 7-day span ending on `end`.
    pub fn week_ending(end: NaiveDate) -> Self {
        DateRange::Span {
            start: end - Duration::days(6),
            end,
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            DateRange::Span { start, .. } => Some(*start),
            DateRange::Single(_) => None,
        }
    }

    pub fn end(&self) -> NaiveDate {
        match self {
            DateRange::Span { end, .. } => *end,
            DateRange::Single(d) => *d,
        }
    }
}

/// One normalized poll figure: one party's number from one table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollRecord {
    pub region: String,
    pub source: String,
    pub election: Election,
    /// Canonical party code, never the raw header label.
    pub party: String,
    pub percentage: f64,
    pub mandates: Option<u32>,
    /// The original row label, verbatim, for audit.
    pub comment: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
}
