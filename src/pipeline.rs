//! Sequential per-source orchestration: fetch → extract → normalize →
//! sink, one source at a time in declaration order. Every source is
//! attempted even if an earlier one fails; failures still fail the run
//! at the end so a stale configuration never passes silently.

use crate::error::{ScrapeError, ScrapeResult};
use crate::normalize::{
    self, parties::PartyResolver, types::RawTable, CellPolicy, NormalizeContext, Normalized,
};
use crate::sources::{SourceSpec, TableLayout};
use crate::store::{self, SchemaVariant};
use crate::{extract, fetch};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub cell_policy: CellPolicy,
    pub schema: SchemaVariant,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cell_policy: CellPolicy::Strict,
            schema: SchemaVariant::SharedTable,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub skips: usize,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

/// Scrape every source into a fresh database at `db_path`.
pub fn run(db_path: &Path, sources: &[SourceSpec], options: PipelineOptions) -> Result<RunSummary> {
    let client = fetch::client().context("building HTTP client")?;
    let parties = PartyResolver::default();
    let mut sink = store::open_sink(options.schema, db_path, &parties.codes())
        .with_context(|| format!("creating database at {}", db_path.display()))?;

    let mut summary = RunSummary::default();

    for spec in sources {
        info!(url = %spec.url, source = %spec.source, "scraping");

        let outcome = fetch::fetch_html(&client, &spec.url)
            .and_then(|html| extract::extract_tables(&html, &spec.selector))
            .and_then(|tables| normalize_tables(spec, &tables, &parties, options.cell_policy));

        let normalized = match outcome {
            Ok(normalized) => normalized,
            Err(err) => {
                error!(url = %spec.url, %err, "source failed");
                summary.sources_failed += 1;
                continue;
            }
        };

        for issue in &normalized.issues {
            warn!(source = %spec.source, %issue, "row skipped");
        }

        let mut inserted = 0usize;
        let stored: ScrapeResult<()> = (|| {
            for record in &normalized.records {
                sink.insert(record)?;
                inserted += 1;
            }
            sink.flush()
        })();
        if let Err(err) = stored {
            error!(url = %spec.url, %err, "sink write failed");
            summary.sources_failed += 1;
            continue;
        }

        info!(
            source = %spec.source,
            records = inserted,
            skips = normalized.issues.len(),
            "source done"
        );
        summary.records += inserted;
        summary.skips += normalized.issues.len();
        summary.sources_ok += 1;
    }

    if summary.sources_failed > 0 {
        bail!(
            "{} of {} sources failed",
            summary.sources_failed,
            sources.len()
        );
    }
    Ok(summary)
}

/// Normalize every table a source page yielded, according to its layout.
fn normalize_tables(
    spec: &SourceSpec,
    tables: &[RawTable],
    parties: &PartyResolver,
    cell_policy: CellPolicy,
) -> ScrapeResult<Normalized> {
    if tables.is_empty() {
        return Err(ScrapeError::UnexpectedTableCount {
            url: spec.url.clone(),
            expected: 1,
            found: 0,
        });
    }

    let ctx = NormalizeContext {
        source: spec.source.clone(),
        region: spec.region.clone(),
        election: spec.election,
        cell_policy,
        table_date: None,
    };

    let mut out = Normalized::default();
    match &spec.layout {
        TableLayout::DateRows => {
            for table in tables {
                let normalized = normalize::normalize(table, parties, &ctx)?;
                out.records.extend(normalized.records);
                out.issues.extend(normalized.issues);
            }
        }
        TableLayout::MonthGrid { years } => {
            // Table position encodes the year; more tables than known
            // years means the archive grew and the list is stale.
            if tables.len() > years.len() {
                return Err(ScrapeError::UnexpectedTableCount {
                    url: spec.url.clone(),
                    expected: years.len(),
                    found: tables.len(),
                });
            }
            for (table, year) in tables.iter().zip(years) {
                let normalized = normalize::normalize_month_grid(table, *year, parties, &ctx)?;
                out.records.extend(normalized.records);
                out.issues.extend(normalized.issues);
            }
        }
    }

    Ok(out)
}
