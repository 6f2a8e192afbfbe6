// src/normalize/dates.rs
//! Raw date labels → concrete dates.
//!
//! Three label families co-exist across the historical page formats:
//!
//! 1. `Uke <w>-<yyyy>` week ranges (pollofpolls rows). Resolved to the
//!    ISO-week end date, with the week starting six days earlier.
//! 2. `<Month> '<yy>` month labels with Norwegian month names, resolved
//!    to the full calendar month.
//! 3. Month-grid column headers (infact archive), where the year comes
//!    from table position rather than the label, and August is split into
//!    two half-month columns (`Aug I`, `Aug II`).
//!
//! On top of that, the publisher has twice mislabeled the first week of a
//! new year with the previous year (`Uke 2-2015` followed by
//! `Uke 1-2014`). The slip is only detectable from the preceding label,
//! so correction is keyed on it.

use crate::error::{ScrapeError, ScrapeResult};
use crate::normalize::types::DateRange;
use chrono::{Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static WEEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Uke (\d{1,2})-(\d{4})").expect("week pattern should be valid"));

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Alphabetic}+)\.? '(\d{2})$").expect("month pattern should be valid")
});

/// Month spellings seen in the sources, abbreviated and full.
static MONTHS: &[(&str, u32)] = &[
    ("Jan", 1),
    ("Januar", 1),
    ("Feb", 2),
    ("Februar", 2),
    ("Mars", 3),
    ("April", 4),
    ("Mai", 5),
    ("Juni", 6),
    ("Juli", 7),
    ("Aug", 8),
    ("August", 8),
    ("Sept", 9),
    ("September", 9),
    ("Okt", 10),
    ("Oktober", 10),
    ("Nov", 11),
    ("November", 11),
    ("Des", 12),
    ("Desember", 12),
];

/// Observed transcription errors: (previous label, mislabeled, corrected).
/// Both are year rollovers where week 1 kept the old year.
static ROLLOVER_FIXES: &[(&str, &str, &str)] = &[
    ("Uke 2-2015", "Uke 1-2014", "Uke 1-2015"),
    ("Uke 2-2014", "Uke 1-2013", "Uke 1-2014"),
];

/// Rewrite a known-bad week label based on the label that preceded it.
/// Returns the input unchanged when no fix applies.
pub fn correct_label<'a>(raw: &'a str, prev: Option<&str>) -> &'a str {
    if let Some(prev) = prev {
        for (before, broken, fixed) in ROLLOVER_FIXES {
            if prev == *before && raw == *broken {
                return fixed;
            }
        }
    }
    raw
}

/// Resolve a row label to the period it covers. `None` means the label
/// matches no known family; the caller decides whether that skips the row
/// or falls back to a whole-table date.
pub fn resolve_row_label(label: &str) -> Option<DateRange> {
    if let Some(caps) = WEEK_RE.captures(label) {
        let week: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[2].parse().ok()?;
        let end = NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)?;
        return Some(DateRange::week_ending(end));
    }

    if let Some(caps) = MONTH_RE.captures(label) {
        let month = month_number(&caps[1])?;
        let short_year: i32 = caps[2].parse().ok()?;
        return Some(month_span(2000 + short_year, month));
    }

    None
}

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(spelling, _)| *spelling == name)
        .map(|(_, n)| *n)
}

/// First through last day of a calendar month.
fn month_span(year: i32, month: u32) -> DateRange {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("month number comes from the fixed table");
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("month number comes from the fixed table");

    DateRange::Span {
        start,
        end: next_month - Duration::days(1),
    }
}

/// Resolve a month-grid column header for a table covering `year`.
/// The archive splits August into two half-month columns; everything else
/// is a plain month name pinned to the first of the month. An unknown
/// header is fatal: it means the archive layout changed.
pub fn resolve_column_header(header: &str, year: i32) -> ScrapeResult<NaiveDate> {
    let day_and_month = match header {
        "Aug I" => (8, 1),
        "Aug II" => (8, 15),
        other => match month_number(other) {
            Some(month) => (month, 1),
            None => return Err(ScrapeError::UnknownColumnHeader(header.to_string())),
        },
    };

    NaiveDate::from_ymd_opt(year, day_and_month.0, day_and_month.1)
        .ok_or_else(|| ScrapeError::UnknownColumnHeader(header.to_string()))
}
