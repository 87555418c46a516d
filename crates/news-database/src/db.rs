//! Database connection and query operations.

use crate::{migrations, DatabaseError, DatabaseResult, NewsRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const RECORD_COLUMNS: &str = "id, source, headline, created_at, is_published";

/// Database handle shared by the RPC handlers and the forwarder.
///
/// All statements run under one connection lock. `append` holds it for the
/// whole id-assignment transaction, which makes concurrent submissions
/// receive distinct, gap-free ids.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a database at the given path, running migrations if needed.
    pub fn open(path: &Path) -> DatabaseResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;
        migrations::run_migrations(&conn)?;

        info!(path = %path.display(), "Database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA temp_store = MEMORY;")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DatabaseResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::Connection("connection lock poisoned".to_string()))
    }

    // ==========================================
    // News records
    // ==========================================

    /// Persist a new unpublished record and return it with its assigned id.
    ///
    /// The id is `MAX(id) + 1`, or 1 on an empty table. The read and the
    /// insert share one `IMMEDIATE` transaction; on error nothing is written.
    pub fn append(&self, source: &str, headline: &str) -> DatabaseResult<NewsRecord> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let next_id: i64 =
            tx.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM news", [], |row| {
                row.get(0)
            })?;
        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO news (id, source, headline, created_at, is_published)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![next_id, source, headline, created_at.to_rfc3339()],
        )?;
        tx.commit()?;

        let id = to_record_id(next_id)?;
        debug!(id, source, "News record appended");
        Ok(NewsRecord {
            id,
            source: source.to_string(),
            headline: headline.to_string(),
            created_at,
            published: false,
        })
    }

    /// Set the published flag of a record.
    ///
    /// Returns `true` when the record exists (whether this call flipped the
    /// flag or it was already set) and `false` for an unknown id. Never
    /// clears the flag.
    pub fn mark_published(&self, id: u64) -> DatabaseResult<bool> {
        let conn = self.lock()?;
        let key = to_sql_id(id)?;

        let changed = conn.execute(
            "UPDATE news SET is_published = 1 WHERE id = ?1 AND is_published = 0",
            params![key],
        )?;
        if changed > 0 {
            debug!(id, "News record marked published");
            return Ok(true);
        }

        let exists = conn
            .query_row("SELECT 1 FROM news WHERE id = ?1", params![key], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            debug!(id, "Ignoring publish confirmation for unknown record");
        }
        Ok(exists)
    }

    /// All records still awaiting delivery, ordered by id.
    pub fn list_unpublished(&self) -> DatabaseResult<Vec<NewsRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM news WHERE is_published = 0 ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], read_record)?;
        collect_records(rows)
    }

    /// Every record, ordered by id.
    pub fn list_records(&self) -> DatabaseResult<Vec<NewsRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM news ORDER BY id ASC"))?;
        let rows = stmt.query_map([], read_record)?;
        collect_records(rows)
    }

    /// Get a record by id.
    pub fn get_record(&self, id: u64) -> DatabaseResult<Option<NewsRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM news WHERE id = ?1"))?;
        let raw = stmt
            .query_row(params![to_sql_id(id)?], read_record)
            .optional()?;
        raw.map(RawRecord::into_record).transpose()
    }

    /// Number of stored records.
    pub fn count_records(&self) -> DatabaseResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
        to_record_id(count)
    }

    /// Verify the connection answers queries.
    pub fn health_check(&self) -> DatabaseResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

/// Row as stored, before id and timestamp conversion.
struct RawRecord {
    id: i64,
    source: String,
    headline: String,
    created_at: String,
    published: bool,
}

impl RawRecord {
    fn into_record(self) -> DatabaseResult<NewsRecord> {
        Ok(NewsRecord {
            id: to_record_id(self.id)?,
            source: self.source,
            headline: self.headline,
            created_at: parse_datetime(&self.created_at)?,
            published: self.published,
        })
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        source: row.get(1)?,
        headline: row.get(2)?,
        created_at: row.get(3)?,
        published: row.get(4)?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<RawRecord>>,
) -> DatabaseResult<Vec<NewsRecord>> {
    rows.map(|row| row.map_err(DatabaseError::from).and_then(RawRecord::into_record))
        .collect()
}

fn parse_datetime(s: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidData(format!("bad timestamp {s:?}: {e}")))
}

fn to_record_id(value: i64) -> DatabaseResult<u64> {
    u64::try_from(value).map_err(|_| DatabaseError::InvalidData(format!("negative id {value}")))
}

fn to_sql_id(id: u64) -> DatabaseResult<i64> {
    i64::try_from(id).map_err(|_| DatabaseError::InvalidData(format!("id {id} out of range")))
}
