// src/normalize/mod.rs
//! Turns one extracted [`RawTable`] into validated [`PollRecord`]s.
//!
//! Two page layouts exist. The poll-of-polls pages put a date label in
//! the first column and one party per remaining column; the infact
//! archive transposes that (parties as rows, months as columns). Both
//! share the same resolvers and the same skip policy: a surprise that
//! indicates stale configuration (unknown party, unclassifiable date,
//! unrecognized month column) aborts the table, while a malformed single
//! row only skips that row with a diagnostic.

pub mod cells;
pub mod dates;
pub mod elections;
pub mod parties;
pub mod types;

use crate::error::ScrapeResult;
use cells::ParsedCell;
use parties::PartyResolver;
use tracing::warn;
use types::{DateRange, Election, PollRecord, RawTable};

/// What to do when a cell fails to parse. Both behaviors shipped at some
/// point: the original pipeline aborted the run, a later rewrite logged
/// and kept going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPolicy {
    Strict,
    Lenient,
}

/// Per-table metadata and policy supplied by the caller.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub source: String,
    pub region: String,
    /// Known statically for sources that publish one series per election;
    /// `None` means infer per record from the poll date.
    pub election: Option<Election>,
    pub cell_policy: CellPolicy,
    /// Whole-table date for pages that state their date once instead of
    /// per row. Used when a row label resolves to nothing.
    pub table_date: Option<DateRange>,
}

/// A recoverable, logged skip. Fatal conditions are [`ScrapeError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    RowShapeMismatch {
        label: String,
        expected: usize,
        found: usize,
    },
    UnresolvableDate {
        label: String,
    },
    MalformedCell {
        label: String,
        party: String,
        cell: String,
    },
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::RowShapeMismatch {
                label,
                expected,
                found,
            } => write!(
                f,
                "row {label:?} has {found} cells, expected {expected}"
            ),
            Issue::UnresolvableDate { label } => {
                write!(f, "unable to parse date from row label {label:?}")
            }
            Issue::MalformedCell { label, party, cell } => {
                write!(f, "row {label:?}, party {party}: unparsable cell {cell:?}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<PollRecord>,
    pub issues: Vec<Issue>,
}

/// Normalize a dates-as-rows table (poll-of-polls layout).
pub fn normalize(
    table: &RawTable,
    parties: &PartyResolver,
    ctx: &NormalizeContext,
) -> ScrapeResult<Normalized> {
    // 1) Resolve the party columns up front; one unknown label kills the
    //    whole table before any row is touched.
    let Some((_, party_labels)) = table.header.split_first() else {
        return Ok(Normalized::default());
    };
    let codes = party_labels
        .iter()
        .map(|label| parties.resolve(label).map(str::to_string))
        .collect::<ScrapeResult<Vec<_>>>()?;

    let mut out = Normalized::default();
    // Label of the previous well-shaped row, in corrected form. Feeds the
    // year-rollover fix; resets with every table.
    let mut prev_label: Option<String> = None;

    for row in &table.rows {
        // 2) Shape check. A short or long row is skipped, not repaired.
        let (raw_label, row_cells) = match row.split_first() {
            Some((label, cells)) if cells.len() == codes.len() => (label, cells),
            _ => {
                warn!(row = ?row, "skipping invalid row");
                out.issues.push(Issue::RowShapeMismatch {
                    label: row.first().cloned().unwrap_or_default(),
                    expected: codes.len(),
                    found: row.len().saturating_sub(1),
                });
                continue;
            }
        };

        // 3) Publisher rollover fix, keyed on the previous label.
        let label = dates::correct_label(raw_label, prev_label.as_deref()).to_string();
        prev_label = Some(label.clone());

        // 4) Resolve the period, falling back to a whole-table date.
        let range = match dates::resolve_row_label(&label).or(ctx.table_date) {
            Some(range) => range,
            None => {
                warn!(label = %raw_label, "unable to parse date from row label");
                out.issues.push(Issue::UnresolvableDate {
                    label: raw_label.clone(),
                });
                continue;
            }
        };

        // 5) One record per cell, paired positionally with its party.
        for (code, cell) in codes.iter().zip(row_cells) {
            match cells::parse_cell(cell) {
                Ok(parsed) => {
                    out.records
                        .push(assemble(ctx, code, raw_label, parsed, range)?)
                }
                Err(err) if ctx.cell_policy == CellPolicy::Strict => return Err(err),
                Err(_) => {
                    warn!(cell = %cell, party = %code, "skipping unparsable cell");
                    out.issues.push(Issue::MalformedCell {
                        label: raw_label.clone(),
                        party: code.clone(),
                        cell: cell.clone(),
                    });
                }
            }
        }
    }

    Ok(out)
}

/// Normalize a months-as-columns table (infact archive layout). The
/// table's year is positional, supplied by the caller.
pub fn normalize_month_grid(
    table: &RawTable,
    year: i32,
    parties: &PartyResolver,
    ctx: &NormalizeContext,
) -> ScrapeResult<Normalized> {
    let Some((_, month_headers)) = table.header.split_first() else {
        return Ok(Normalized::default());
    };
    // An unrecognized month column is a layout change, not a bad row.
    let dates = month_headers
        .iter()
        .map(|header| dates::resolve_column_header(header, year))
        .collect::<ScrapeResult<Vec<_>>>()?;

    let mut out = Normalized::default();

    for row in &table.rows {
        let Some((party_label, row_cells)) = row.split_first() else {
            continue;
        };
        // The grid ends with a sum row; it is layout, not a party.
        if party_label == "Total" {
            continue;
        }
        let code = parties.resolve(party_label)?.to_string();

        if row_cells.len() != dates.len() {
            warn!(row = ?row, "skipping invalid row");
            out.issues.push(Issue::RowShapeMismatch {
                label: party_label.clone(),
                expected: dates.len(),
                found: row_cells.len(),
            });
            continue;
        }

        for (date, cell) in dates.iter().zip(row_cells) {
            // Future months are published as empty cells.
            if cell.is_empty() {
                continue;
            }
            match cells::parse_bare_percentage(cell) {
                Ok(parsed) => out.records.push(assemble(
                    ctx,
                    &code,
                    party_label,
                    parsed,
                    DateRange::Single(*date),
                )?),
                Err(err) if ctx.cell_policy == CellPolicy::Strict => return Err(err),
                Err(_) => {
                    warn!(cell = %cell, party = %code, "skipping unparsable cell");
                    out.issues.push(Issue::MalformedCell {
                        label: party_label.clone(),
                        party: code.clone(),
                        cell: cell.clone(),
                    });
                }
            }
        }
    }

    Ok(out)
}

fn assemble(
    ctx: &NormalizeContext,
    party: &str,
    label: &str,
    cell: ParsedCell,
    range: DateRange,
) -> ScrapeResult<PollRecord> {
    let end_date = range.end();
    let election = match ctx.election {
        Some(election) => election,
        None => elections::classify(end_date)?,
    };

    Ok(PollRecord {
        region: ctx.region.clone(),
        source: ctx.source.clone(),
        election,
        party: party.to_string(),
        percentage: cell.percentage,
        mandates: cell.mandates,
        comment: label.to_string(),
        start_date: range.start(),
        end_date,
    })
}
