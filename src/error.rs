//! Unified error type for the scrape pipeline.
//! Fatal variants all point at a stale configuration (an unmapped party, a
//! date outside the classifier table, a page layout change) and must abort
//! the source rather than let miscategorized rows through.

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    // ---------------------------
    // Configuration gaps
    // ---------------------------
    #[error("unknown party label: {0:?}")]
    UnknownParty(String),

    #[error("no election interval covers {0}")]
    UnclassifiableDate(NaiveDate),

    #[error("{url}: expected {expected} table(s), found {found}")]
    UnexpectedTableCount {
        url: String,
        expected: usize,
        found: usize,
    },

    // ---------------------------
    // Content errors
    // ---------------------------
    #[error("unable to parse cell: {0:?}")]
    MalformedCell(String),

    #[error("unable to resolve month column header: {0:?}")]
    UnknownColumnHeader(String),

    #[error("invalid CSS selector: {0:?}")]
    BadSelector(String),

    #[error("invalid URL: {0}")]
    BadUrl(#[from] url::ParseError),

    #[error("source config error: {0}")]
    Config(#[from] serde_json::Error),

    // ---------------------------
    // Transport & storage
    // ---------------------------
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
