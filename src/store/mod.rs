// src/store/mod.rs
//! SQLite persistence.
//!
//! Two schema conventions exist across the historical pipeline variants
//! and both are kept behind [`RecordSink`]:
//!
//! - [`SqliteSink`]: one shared `polls` table, one row per (poll, party)
//!   record.
//! - [`PerElectionSink`]: one table per election, one row per poll, with
//!   `<party>_percent` / `<party>_mandates` columns. The normalizer only
//!   ever emits records; the pivot back into wide rows happens here,
//!   keyed by the party ordering the schema was created with.
//!
//! The target database is rebuilt from scratch on every run.

use crate::error::ScrapeResult;
use crate::normalize::types::{Election, PollRecord};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::Value, Connection};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Which schema convention the run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    SharedTable,
    PerElection,
}

pub trait RecordSink {
    fn insert(&mut self, record: &PollRecord) -> ScrapeResult<()>;
    /// Complete any buffered work. A no-op for row-per-record sinks.
    fn flush(&mut self) -> ScrapeResult<()> {
        Ok(())
    }
}

/// Open the requested sink variant at `path`, replacing any existing
/// database file. `parties` is the canonical party ordering used for
/// per-party columns; the shared-table variant ignores it.
pub fn open_sink(
    variant: SchemaVariant,
    path: &Path,
    parties: &[String],
) -> ScrapeResult<Box<dyn RecordSink>> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    let conn = Connection::open(path)?;
    info!(path = %path.display(), ?variant, "database created");

    Ok(match variant {
        SchemaVariant::SharedTable => Box::new(SqliteSink::with_connection(conn)?),
        SchemaVariant::PerElection => {
            Box::new(PerElectionSink::with_connection(conn, parties.to_vec())?)
        }
    })
}

// ---------------------------------------------------------------------
// Shared-table variant
// ---------------------------------------------------------------------

pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn with_connection(conn: Connection) -> ScrapeResult<Self> {
        conn.execute(
            "CREATE TABLE polls (
                startDate date,
                endDate date NOT NULL,
                source varchar(255) NOT NULL,
                election varchar(50),
                region varchar(255) NOT NULL,
                party varchar(10) NOT NULL,
                percentage float NOT NULL,
                comment varchar(255),
                mandates integer
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl RecordSink for SqliteSink {
    fn insert(&mut self, record: &PollRecord) -> ScrapeResult<()> {
        self.conn.execute(
            "INSERT INTO polls
                (startDate, endDate, source, election, region, party,
                 percentage, comment, mandates)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.start_date.map(|d| d.to_string()),
                record.end_date.to_string(),
                record.source,
                record.election.as_str(),
                record.region,
                record.party,
                record.percentage,
                record.comment,
                record.mandates,
            ],
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Per-election variant
// ---------------------------------------------------------------------

/// Buffered poll row under assembly. Records arrive in row-then-column
/// order, so one buffer is enough: a new (election, label, date) key
/// means the previous poll row is complete.
struct PendingRow {
    election: Election,
    name: String,
    date: NaiveDate,
    values: HashMap<String, (f64, Option<u32>)>,
}

pub struct PerElectionSink {
    conn: Connection,
    parties: Vec<String>,
    created: HashSet<Election>,
    pending: Option<PendingRow>,
}

impl PerElectionSink {
    pub fn with_connection(conn: Connection, parties: Vec<String>) -> ScrapeResult<Self> {
        Ok(Self {
            conn,
            parties,
            created: HashSet::new(),
            pending: None,
        })
    }

    fn column_prefix(party: &str) -> String {
        party.to_lowercase()
    }

    fn ensure_table(&mut self, election: Election) -> ScrapeResult<()> {
        if self.created.contains(&election) {
            return Ok(());
        }
        let mut columns = vec!["name varchar(255)".to_string(), "date date".to_string()];
        for party in &self.parties {
            let prefix = Self::column_prefix(party);
            columns.push(format!("{prefix}_percent float"));
            columns.push(format!("{prefix}_mandates integer"));
        }
        self.conn.execute(
            &format!("CREATE TABLE {} ({})", election.as_str(), columns.join(", ")),
            [],
        )?;
        self.created.insert(election);
        Ok(())
    }

    fn write_row(&mut self, row: PendingRow) -> ScrapeResult<()> {
        self.ensure_table(row.election)?;

        let mut columns = vec!["name".to_string(), "date".to_string()];
        let mut values = vec![
            Value::Text(row.name),
            Value::Text(row.date.to_string()),
        ];
        for party in &self.parties {
            let prefix = Self::column_prefix(party);
            columns.push(format!("{prefix}_percent"));
            columns.push(format!("{prefix}_mandates"));
            match row.values.get(party) {
                Some((percent, mandates)) => {
                    values.push(Value::Real(*percent));
                    values.push(match mandates {
                        Some(m) => Value::Integer(*m as i64),
                        None => Value::Null,
                    });
                }
                None => {
                    values.push(Value::Null);
                    values.push(Value::Null);
                }
            }
        }

        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                row.election.as_str(),
                columns.join(", "),
                placeholders
            ),
            params_from_iter(values),
        )?;
        Ok(())
    }
}

impl RecordSink for PerElectionSink {
    fn insert(&mut self, record: &PollRecord) -> ScrapeResult<()> {
        let same_row = self.pending.as_ref().is_some_and(|row| {
            row.election == record.election
                && row.name == record.comment
                && row.date == record.end_date
        });
        if !same_row {
            if let Some(done) = self.pending.take() {
                self.write_row(done)?;
            }
            self.pending = Some(PendingRow {
                election: record.election,
                name: record.comment.clone(),
                date: record.end_date,
                values: HashMap::new(),
            });
        }

        self.pending
            .as_mut()
            .expect("pending row was just ensured")
            .values
            .insert(record.party.clone(), (record.percentage, record.mandates));
        Ok(())
    }

    fn flush(&mut self) -> ScrapeResult<()> {
        if let Some(done) = self.pending.take() {
            self.write_row(done)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(party: &str, comment: &str, end: NaiveDate) -> PollRecord {
        PollRecord {
            region: "Norge".to_string(),
            source: "pollofpolls.no".to_string(),
            election: Election::Parliament,
            party: party.to_string(),
            percentage: 34.5,
            mandates: Some(62),
            comment: comment.to_string(),
            start_date: Some(end - chrono::Duration::days(6)),
            end_date: end,
        }
    }

    #[test]
    fn shared_table_round_trips_a_record() {
        let mut sink =
            SqliteSink::with_connection(Connection::open_in_memory().unwrap()).unwrap();
        let end = NaiveDate::from_ymd_opt(2015, 1, 11).unwrap();
        sink.insert(&record("A", "Uke 2-2015", end)).unwrap();
        sink.flush().unwrap();

        let (start, party, pct, mandates): (String, String, f64, Option<u32>) = sink
            .conn
            .query_row(
                "SELECT startDate, party, percentage, mandates FROM polls",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(start, "2015-01-05");
        assert_eq!(party, "A");
        assert_eq!(pct, 34.5);
        assert_eq!(mandates, Some(62));
    }

    #[test]
    fn shared_table_stores_null_start_and_mandates() {
        let mut sink =
            SqliteSink::with_connection(Connection::open_in_memory().unwrap()).unwrap();
        let end = NaiveDate::from_ymd_opt(2014, 8, 15).unwrap();
        let mut rec = record("A", "Ap", end);
        rec.start_date = None;
        rec.mandates = None;
        sink.insert(&rec).unwrap();

        let (start, mandates): (Option<String>, Option<u32>) = sink
            .conn
            .query_row("SELECT startDate, mandates FROM polls", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(start, None);
        assert_eq!(mandates, None);
    }

    #[test]
    fn per_election_sink_pivots_records_into_wide_rows() {
        let parties = vec!["A".to_string(), "FrP".to_string()];
        let mut sink =
            PerElectionSink::with_connection(Connection::open_in_memory().unwrap(), parties)
                .unwrap();

        let end = NaiveDate::from_ymd_opt(2015, 1, 11).unwrap();
        let mut a = record("A", "Uke 2-2015", end);
        a.percentage = 34.5;
        let mut frp = record("FrP", "Uke 2-2015", end);
        frp.percentage = 15.2;
        frp.mandates = Some(28);

        let next_end = NaiveDate::from_ymd_opt(2015, 1, 4).unwrap();
        let next = record("A", "Uke 1-2015", next_end);

        sink.insert(&a).unwrap();
        sink.insert(&frp).unwrap();
        sink.insert(&next).unwrap();
        sink.flush().unwrap();

        let rows: i64 = sink
            .conn
            .query_row("SELECT count(*) FROM parliament", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 2);

        let (name, a_pct, frp_pct, frp_mand): (String, f64, f64, i64) = sink
            .conn
            .query_row(
                "SELECT name, a_percent, frp_percent, frp_mandates
                 FROM parliament WHERE name = 'Uke 2-2015'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(name, "Uke 2-2015");
        assert_eq!(a_pct, 34.5);
        assert_eq!(frp_pct, 15.2);
        assert_eq!(frp_mand, 28);

        // The trailing row only has figures for A; FrP columns stay NULL.
        let frp_missing: Option<f64> = sink
            .conn
            .query_row(
                "SELECT frp_percent FROM parliament WHERE name = 'Uke 1-2015'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(frp_missing, None);
    }

    #[test]
    fn per_election_sink_creates_one_table_per_election() {
        let parties = vec!["A".to_string()];
        let mut sink =
            PerElectionSink::with_connection(Connection::open_in_memory().unwrap(), parties)
                .unwrap();

        let end = NaiveDate::from_ymd_opt(2015, 1, 11).unwrap();
        let mut muni = record("A", "Uke 2-2015", end);
        muni.election = Election::Municipality;
        sink.insert(&record("A", "Uke 2-2015", end)).unwrap();
        sink.insert(&muni).unwrap();
        sink.flush().unwrap();

        let tables: Vec<String> = sink
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tables, ["municipality", "parliament"]);
    }

    #[test]
    fn open_sink_replaces_an_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.sqlite");
        std::fs::write(&path, b"stale").unwrap();

        let mut sink = open_sink(SchemaVariant::SharedTable, &path, &[]).unwrap();
        let end = NaiveDate::from_ymd_opt(2015, 1, 11).unwrap();
        sink.insert(&record("A", "Uke 2-2015", end)).unwrap();
        sink.flush().unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM polls", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
