//! SQLite persistence layer for run inputs.
//!
//! RULE: Only store/ talks to the database.
//! The store holds what the upstream batch run produced (runs, cluster
//! assignments, recommendations). Derived views are never written back.

use crate::{
    error::{InsightsError, InsightsResult},
    model::{parse_timestamp, Run, RunStatus},
    types::RunId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

mod customer;
mod recommendation;
mod snapshot;

pub struct InsightsStore {
    conn: Connection,
}

/// JSON blob kept in `batch_runs.notes`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct RunNotes {
    #[serde(default)]
    customers_processed: Option<u64>,
    #[serde(default)]
    clusters_count: Option<u64>,
}

impl InsightsStore {
    pub fn open(path: &str) -> InsightsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA busy_timeout=30000;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> InsightsResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order. Idempotent.
    pub fn migrate(&self) -> InsightsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_batch_runs.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_customers.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_recommendations.sql"))?;
        Ok(())
    }

    // ── Runs ───────────────────────────────────────────────────

    /// Record a new run in `running` state and return its id.
    pub fn insert_run(&self, started_at: DateTime<Utc>) -> InsightsResult<RunId> {
        self.conn.execute(
            "INSERT INTO batch_runs (started_at, status) VALUES (?1, ?2)",
            params![started_at.to_rfc3339(), RunStatus::Running.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn finish_run(
        &self,
        run_id: RunId,
        status: RunStatus,
        finished_at: DateTime<Utc>,
        customers_processed: u64,
        clusters_count: u64,
    ) -> InsightsResult<()> {
        let notes = serde_json::to_string(&RunNotes {
            customers_processed: Some(customers_processed),
            clusters_count: Some(clusters_count),
        })?;
        let updated = self.conn.execute(
            "UPDATE batch_runs SET finished_at = ?1, status = ?2, notes = ?3 WHERE id = ?4",
            params![finished_at.to_rfc3339(), status.as_str(), notes, run_id],
        )?;
        if updated == 0 {
            return Err(InsightsError::RunNotFound { run_id });
        }
        Ok(())
    }

    /// Most recent runs first.
    pub fn list_runs(&self, limit: usize) -> InsightsResult<Vec<Run>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, status, notes
             FROM batch_runs
             ORDER BY started_at DESC, id DESC
             LIMIT ?1",
        )?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("listed {} batch run(s)", runs.len());
        Ok(runs)
    }

    pub fn run(&self, run_id: RunId) -> InsightsResult<Run> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, status, notes
                 FROM batch_runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(InsightsError::RunNotFound { run_id })
    }

    /// The latest successful run older than `run_id`, if any.
    pub fn previous_successful_run(&self, run_id: RunId) -> InsightsResult<Option<Run>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, status, notes
                 FROM batch_runs
                 WHERE id < ?1 AND status = 'success'
                 ORDER BY id DESC LIMIT 1",
                params![run_id],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<Run> {
    let notes: Option<String> = row.get(4)?;
    let notes = notes
        .and_then(|raw| serde_json::from_str::<RunNotes>(&raw).ok())
        .unwrap_or_default();
    Ok(Run {
        run_id: row.get(0)?,
        started_at: row.get::<_, Option<String>>(1)?.as_deref().and_then(parse_timestamp),
        finished_at: row.get::<_, Option<String>>(2)?.as_deref().and_then(parse_timestamp),
        status: RunStatus::from(row.get::<_, String>(3)?),
        customers_processed: notes.customers_processed,
        clusters_count: notes.clusters_count,
    })
}
