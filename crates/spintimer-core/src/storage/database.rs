//! SQLite-based saved-set storage.
//!
//! Provides persistent storage for named, reusable interval sequences.
//! The session engine never touches this store; callers load a set here and
//! hand its sequence to the session.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::timer::{IntervalDefinition, IntervalSequence};

const SCHEMA_VERSION: i64 = 1;

/// A named interval sequence kept for reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSet {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub intervals: Vec<IntervalDefinition>,
    pub total_duration_secs: u64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl SavedSet {
    /// Rebuild the sequence this set captured.
    pub fn sequence(&self) -> Result<IntervalSequence> {
        IntervalSequence::build(self.intervals.clone())
    }
}

/// SQLite database for saved sets.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/spintimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_path(&data_dir()?.join("spintimer.db"))
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS saved_sets (
                    id             TEXT PRIMARY KEY,
                    name           TEXT NOT NULL,
                    description    TEXT,
                    intervals      TEXT NOT NULL,
                    total_secs     INTEGER NOT NULL,
                    created_at     TEXT NOT NULL,
                    last_used_at   TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_saved_sets_created_at ON saved_sets(created_at);

                PRAGMA user_version = 1;",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        debug!(from = version, to = SCHEMA_VERSION, "migrated saved-set schema");
        Ok(())
    }

    /// Store a deep copy of `sequence` under a new id.
    pub fn create_saved_set(
        &self,
        name: &str,
        description: Option<&str>,
        sequence: &IntervalSequence,
    ) -> Result<SavedSet> {
        let set = SavedSet {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.map(str::to_string).filter(|d| !d.is_empty()),
            intervals: sequence.intervals().to_vec(),
            total_duration_secs: sequence.total_duration_secs(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.conn.execute(
            "INSERT INTO saved_sets (id, name, description, intervals, total_secs, created_at, last_used_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL)",
            params![
                set.id,
                set.name,
                set.description,
                serde_json::to_string(&set.intervals)?,
                set.total_duration_secs as i64,
                timestamp(set.created_at),
            ],
        )?;
        debug!(id = %set.id, name = %set.name, "saved set created");
        Ok(set)
    }

    /// All saved sets, newest first. Rows that fail to decode are skipped.
    pub fn list_saved_sets(&self) -> Result<Vec<SavedSet>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, intervals, total_secs, created_at, last_used_at
             FROM saved_sets ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], raw_row)?;

        let mut sets = Vec::new();
        for row in rows {
            match decode(row?) {
                Ok(set) => sets.push(set),
                Err(e) => warn!("skipping saved set: {e}"),
            }
        }
        Ok(sets)
    }

    pub fn get_saved_set(&self, id: &str) -> Result<Option<SavedSet>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, description, intervals, total_secs, created_at, last_used_at
                 FROM saved_sets WHERE id = ?1",
                params![id],
                raw_row,
            )
            .optional()?;
        raw.map(decode).transpose()
    }

    /// Replace name, description and intervals of an existing set.
    pub fn update_saved_set(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
        sequence: &IntervalSequence,
    ) -> Result<SavedSet> {
        let changed = self.conn.execute(
            "UPDATE saved_sets SET name = ?2, description = ?3, intervals = ?4, total_secs = ?5
             WHERE id = ?1",
            params![
                id,
                name.trim(),
                description.filter(|d| !d.is_empty()),
                serde_json::to_string(sequence.intervals())?,
                sequence.total_duration_secs() as i64,
            ],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        self.get_saved_set(id)?.ok_or_else(|| not_found(id))
    }

    /// Rename a set, keeping its intervals.
    pub fn rename_saved_set(&self, id: &str, name: &str) -> Result<SavedSet> {
        let changed = self.conn.execute(
            "UPDATE saved_sets SET name = ?2 WHERE id = ?1",
            params![id, name.trim()],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        self.get_saved_set(id)?.ok_or_else(|| not_found(id))
    }

    /// Returns whether a set was deleted.
    pub fn delete_saved_set(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM saved_sets WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Mark a set as used now and return it. This is the "load set" path.
    pub fn touch_saved_set(&self, id: &str) -> Result<SavedSet> {
        let changed = self.conn.execute(
            "UPDATE saved_sets SET last_used_at = ?2 WHERE id = ?1",
            params![id, timestamp(Utc::now())],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        self.get_saved_set(id)?.ok_or_else(|| not_found(id))
    }

    /// Find a set by exact id, then by unique id prefix, then by exact name.
    /// A blank key matches nothing.
    pub fn find_saved_set(&self, key: &str) -> Result<Option<SavedSet>> {
        if key.trim().is_empty() {
            return Ok(None);
        }
        if let Some(set) = self.get_saved_set(key)? {
            return Ok(Some(set));
        }
        let all = self.list_saved_sets()?;
        let by_prefix: Vec<_> = all.iter().filter(|s| s.id.starts_with(key)).collect();
        if let [only] = by_prefix.as_slice() {
            return Ok(Some((*only).clone()));
        }
        Ok(all.into_iter().find(|s| s.name == key))
    }
}

type RawRow = (
    String,
    String,
    Option<String>,
    String,
    i64,
    String,
    Option<String>,
);

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn decode(raw: RawRow) -> Result<SavedSet> {
    let (id, name, description, intervals, total_secs, created_at, last_used_at) = raw;
    let corrupt = |message: String| DatabaseError::CorruptRow {
        table: "saved_sets",
        message: format!("{id}: {message}"),
    };
    let intervals: Vec<IntervalDefinition> =
        serde_json::from_str(&intervals).map_err(|e| corrupt(e.to_string()))?;
    let created_at = parse_ts(&created_at).map_err(&corrupt)?;
    let last_used_at = last_used_at
        .as_deref()
        .map(parse_ts)
        .transpose()
        .map_err(&corrupt)?;
    Ok(SavedSet {
        id,
        name,
        description,
        intervals,
        total_duration_secs: total_secs.max(0) as u64,
        created_at,
        last_used_at,
    })
}

fn parse_ts(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{value}': {e}"))
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed width so text ordering matches time ordering.
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        kind: "saved set",
        id: id.to_string(),
    }
}
