//! Poll-figure cell parsing.
//!
//! pollofpolls cells look like `"12,3 (4)"`: a decimal-comma percentage
//! followed by a parenthesized mandate count. The infact archive grids
//! carry bare percentages (`"12,3"`, sometimes with a `%` suffix) and no
//! mandates.

use crate::error::{ScrapeError, ScrapeResult};
use once_cell::sync::Lazy;
use regex::Regex;

static CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\d,]+) \((\d+)\)").expect("cell pattern should be valid"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedCell {
    pub percentage: f64,
    pub mandates: Option<u32>,
}

/// Parse a `"<pct> (<mandates>)"` cell. The error carries the raw cell
/// text so a source format change shows up in the logs verbatim.
pub fn parse_cell(raw: &str) -> ScrapeResult<ParsedCell> {
    let caps = CELL_RE
        .captures(raw)
        .ok_or_else(|| ScrapeError::MalformedCell(raw.to_string()))?;

    let percentage = parse_percentage(&caps[1])
        .ok_or_else(|| ScrapeError::MalformedCell(raw.to_string()))?;
    let mandates: u32 = caps[2]
        .parse()
        .map_err(|_| ScrapeError::MalformedCell(raw.to_string()))?;

    Ok(ParsedCell {
        percentage,
        mandates: Some(mandates),
    })
}

/// Parse a bare grid percentage, tolerating a trailing `%`.
pub fn parse_bare_percentage(raw: &str) -> ScrapeResult<ParsedCell> {
    let trimmed = raw.trim().trim_end_matches('%').trim();
    let percentage = parse_percentage(trimmed)
        .ok_or_else(|| ScrapeError::MalformedCell(raw.to_string()))?;

    Ok(ParsedCell {
        percentage,
        mandates: None,
    })
}

/// Decimal comma → dot, then numeric parse. Anything outside 0–100 is
/// rejected: the sources publish percentages, so an out-of-range value
/// means the pattern matched the wrong thing.
fn parse_percentage(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let value: f64 = digits.replace(',', ".").parse().ok()?;
    if (0.0..=100.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_comma_cell_round_trips() {
        let cell = parse_cell("12,3 (4)").unwrap();
        assert_eq!(cell.percentage, 12.3);
        assert_eq!(cell.mandates, Some(4));
    }

    #[test]
    fn integer_percentage() {
        let cell = parse_cell("21 (35)").unwrap();
        assert_eq!(cell.percentage, 21.0);
        assert_eq!(cell.mandates, Some(35));
    }

    #[test]
    fn trailing_text_after_mandates_is_tolerated() {
        // Some pages append footnote markers after the parenthesis.
        let cell = parse_cell("4,2 (7) *").unwrap();
        assert_eq!(cell.percentage, 4.2);
        assert_eq!(cell.mandates, Some(7));
    }

    #[test]
    fn malformed_cell_carries_raw_text() {
        let err = parse_cell("n/a").unwrap_err();
        match err {
            ScrapeError::MalformedCell(raw) => assert_eq!(raw, "n/a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_mandates_is_malformed_in_strict_format() {
        assert!(parse_cell("12,3").is_err());
    }

    #[test]
    fn out_of_range_percentage_is_malformed() {
        // "1,234" style thousands artifacts must not pass as 1234%.
        assert!(parse_cell("123,4 (2)").is_err());
        assert!(parse_bare_percentage("101").is_err());
    }

    #[test]
    fn bare_grid_percentage_with_percent_sign() {
        let cell = parse_bare_percentage("33,5%").unwrap();
        assert_eq!(cell.percentage, 33.5);
        assert_eq!(cell.mandates, None);
        assert_eq!(parse_bare_percentage("7,1").unwrap().percentage, 7.1);
    }
}
