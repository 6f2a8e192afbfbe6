//! Date → election-type inference.
//!
//! The infact tracking series never states which election its figures
//! target, but Norway alternates parliamentary and local elections on a
//! fixed two-year September rhythm, so the target follows from the date:
//! each interval runs from the month after one election through the end
//! of the next election's September.

use crate::error::{ScrapeError, ScrapeResult};
use crate::normalize::types::Election;
use chrono::NaiveDate;
use once_cell::sync::Lazy;

/// Closed, non-overlapping intervals in ascending order, tiling the whole
/// period the archive can produce. Elections covered: parliament 2009,
/// 2013, 2017, 2021; municipal 2011, 2015, 2019.
static INTERVALS: Lazy<Vec<(NaiveDate, NaiveDate, Election)>> = Lazy::new(|| {
    let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("interval table dates are valid");
    vec![
        (ymd(2008, 1, 1), ymd(2009, 9, 30), Election::Parliament),
        (ymd(2009, 10, 1), ymd(2011, 9, 30), Election::Municipality),
        (ymd(2011, 10, 1), ymd(2013, 9, 30), Election::Parliament),
        (ymd(2013, 10, 1), ymd(2015, 9, 30), Election::Municipality),
        (ymd(2015, 10, 1), ymd(2017, 9, 30), Election::Parliament),
        (ymd(2017, 10, 1), ymd(2019, 9, 30), Election::Municipality),
        (ymd(2019, 10, 1), ymd(2021, 9, 30), Election::Parliament),
    ]
});

/// Classify a poll date. A date outside every interval means the table
/// above has gone stale and must be extended; treating it as anything
/// else would file the record under the wrong election.
pub fn classify(date: NaiveDate) -> ScrapeResult<Election> {
    INTERVALS
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&date))
        .map(|(_, _, election)| *election)
        .ok_or(ScrapeError::UnclassifiableDate(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn spring_2011_targets_the_municipal_election() {
        assert_eq!(classify(ymd(2011, 3, 1)).unwrap(), Election::Municipality);
        assert_eq!(classify(ymd(2011, 6, 15)).unwrap(), Election::Municipality);
        assert_eq!(classify(ymd(2011, 9, 30)).unwrap(), Election::Municipality);
    }

    #[test]
    fn the_day_after_the_cutover_targets_parliament() {
        assert_eq!(classify(ymd(2011, 10, 1)).unwrap(), Election::Parliament);
    }

    #[test]
    fn archive_extremes_are_covered() {
        assert_eq!(classify(ymd(2009, 1, 1)).unwrap(), Election::Parliament);
        assert_eq!(classify(ymd(2015, 8, 15)).unwrap(), Election::Municipality);
    }

    #[test]
    fn dates_outside_the_table_are_fatal() {
        let err = classify(ymd(1997, 5, 1)).unwrap_err();
        match err {
            ScrapeError::UnclassifiableDate(d) => assert_eq!(d, ymd(1997, 5, 1)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(classify(ymd(2022, 1, 1)).is_err());
    }

    #[test]
    fn intervals_tile_without_gaps_or_overlaps() {
        for pair in INTERVALS.windows(2) {
            let (_, end, _) = pair[0];
            let (next_start, _, _) = pair[1];
            assert_eq!(next_start, end + chrono::Duration::days(1));
        }
    }
}
