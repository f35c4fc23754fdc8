//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database. The pipeline flushes
//! through [`UpsertSink`]; nothing else executes SQL directly.

use rusqlite::Connection;

use crate::batch::FlushSink;
use crate::entity::{EntitySpec, Row};
use crate::error::{LoadError, LoadResult};
use crate::policy::ConflictAction;
use crate::rng::WorkerRng;

pub struct LoadStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl LoadStore {
    pub fn open(path: &str) -> LoadResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LoadResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database. In-memory stores
    /// get a fresh, isolated database.
    pub fn reopen(&self) -> LoadResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply the schema.
    pub fn migrate(&self) -> LoadResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_schema.sql"))?;
        Ok(())
    }

    /// Execute one multi-row upsert in a single round trip. `action`
    /// is `None` for append-only entities. Failures are wrapped with
    /// enough context to reproduce (entity, batch size, key range)
    /// and are never retried here.
    pub fn bulk_upsert(
        &self,
        spec: &'static EntitySpec,
        action: Option<ConflictAction>,
        batch: &[Row],
    ) -> LoadResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let sql = insert_sql(spec, action, batch.len());
        let values = rusqlite::params_from_iter(batch.iter().flat_map(|row| row.iter()));
        self.conn
            .execute(&sql, values)
            .map_err(|source| flush_error(spec, batch, source))?;
        Ok(())
    }

    // ── Test / summary helpers ─────────────────────────────────────

    pub fn row_count(&self, spec: &EntitySpec) -> LoadResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", spec.table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch one column of the row matching the entity's key.
    pub fn column_for_key(
        &self,
        spec: &EntitySpec,
        column: &str,
        key: &str,
    ) -> LoadResult<String> {
        let key_col = spec
            .key
            .ok_or_else(|| anyhow::anyhow!("'{}' has no dedup key", spec.table))?;
        let sql = format!(
            "SELECT {column} FROM \"{}\" WHERE {key_col} = ?1",
            spec.table
        );
        let value: String = self.conn.query_row(&sql, [key], |row| row.get(0))?;
        Ok(value)
    }
}

/// Build the bulk insert statement: one row-group per tuple,
/// positional placeholders, conflict clause per the chosen action.
pub fn insert_sql(spec: &EntitySpec, action: Option<ConflictAction>, rows: usize) -> String {
    let tuple = format!("({})", vec!["?"; spec.columns.len()].join(", "));
    let values = vec![tuple; rows].join(", ");
    let mut sql = format!(
        "INSERT INTO \"{}\" ({}) VALUES {}",
        spec.table,
        spec.columns.join(", "),
        values
    );
    match (spec.key, action) {
        (Some(key), Some(ConflictAction::UpdateOnConflict)) => {
            let assignments: Vec<String> = spec
                .columns
                .iter()
                .filter(|c| **c != key)
                .map(|c| format!("{c} = excluded.{c}"))
                .collect();
            sql.push_str(&format!(
                " ON CONFLICT ({key}) DO UPDATE SET {}",
                assignments.join(", ")
            ));
        }
        (Some(_), Some(ConflictAction::IgnoreOnConflict)) => {
            sql.push_str(" ON CONFLICT DO NOTHING");
        }
        _ => {}
    }
    sql
}

fn flush_error(spec: &'static EntitySpec, batch: &[Row], source: rusqlite::Error) -> LoadError {
    let key_of = |row: &Row| match spec.key_index() {
        Some(i) => row[i].clone(),
        None => "-".to_string(),
    };
    LoadError::Flush {
        entity: spec.table,
        rows: batch.len(),
        first_key: batch.first().map(key_of).unwrap_or_default(),
        last_key: batch.last().map(key_of).unwrap_or_default(),
        source,
    }
}

/// Production flush sink: draws the conflict policy once per keyed
/// flush and hands the batch to the store.
pub struct UpsertSink<'a> {
    store: &'a LoadStore,
    rng: WorkerRng,
    update_freq: u32,
}

impl<'a> UpsertSink<'a> {
    pub fn new(store: &'a LoadStore, rng: WorkerRng, update_freq: u32) -> Self {
        Self {
            store,
            rng,
            update_freq,
        }
    }
}

impl FlushSink for UpsertSink<'_> {
    fn flush(&mut self, spec: &'static EntitySpec, batch: &[Row]) -> LoadResult<()> {
        // Append-only entities skip the draw entirely so their
        // flushes do not perturb the policy stream.
        let action = spec
            .key
            .map(|_| ConflictAction::choose(self.update_freq, &mut self.rng));
        log::debug!(
            "flush {} rows into {} ({:?})",
            batch.len(),
            spec.table,
            action
        );
        self.store.bulk_upsert(spec, action, batch)
    }
}
