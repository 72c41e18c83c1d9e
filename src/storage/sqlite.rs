//! SQLite storage implementations
//!
//! This module provides SQLite-backed implementations of the [`ResultStore`]
//! and [`DuplicateTracker`] traits. Both open their own connection, so they can
//! share one database file.

use crate::crawler::ExtractedResult;
use crate::state::DuplicateTracker;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How long a connection waits on a lock held by the other connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a database file and initializes the schema
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(Connection)` - Successfully opened/created database
/// * `Err(rusqlite::Error)` - Failed to open database
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    // Configure SQLite for better performance
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA temp_store = MEMORY;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}

fn init_in_memory() -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open_in_memory()?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// Result store persisting each target's results as a JSON array
pub struct SqliteResultStore {
    conn: Mutex<Connection>,
}

impl SqliteResultStore {
    /// Opens or creates the store at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(init_database(path)?),
        })
    }

    /// Creates a store backed by a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(init_in_memory()?),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultStore for SqliteResultStore {
    fn store(&self, target: &str, results: Vec<ExtractedResult>) -> StorageResult<()> {
        let payload = serde_json::to_string(&results)?;
        let now = Utc::now().to_rfc3339();

        self.conn().execute(
            "INSERT INTO results (target, payload, stored_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(target) DO UPDATE SET payload = excluded.payload, stored_at = excluded.stored_at",
            params![target, payload, now],
        )?;

        Ok(())
    }

    fn get(&self, target: &str) -> StorageResult<Option<Vec<ExtractedResult>>> {
        let payload: Option<String> = self
            .conn()
            .query_row(
                "SELECT payload FROM results WHERE target = ?1",
                params![target],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    fn get_all(&self) -> StorageResult<HashMap<String, Vec<ExtractedResult>>> {
        let rows = {
            let conn = self.conn();
            let mut stmt = conn.prepare("SELECT target, payload FROM results")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut all = HashMap::with_capacity(rows.len());
        for (target, payload) in rows {
            all.insert(target, serde_json::from_str(&payload)?);
        }

        Ok(all)
    }

    fn clear(&self) -> StorageResult<()> {
        self.conn().execute("DELETE FROM results", [])?;
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Duplicate tracker persisting visited targets
///
/// A database error is logged and treats the target as already visited, so
/// a broken database stops the crawl from growing instead of refetching.
pub struct SqliteDuplicateTracker {
    conn: Mutex<Connection>,
}

impl SqliteDuplicateTracker {
    /// Opens or creates the tracker at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(init_database(path)?),
        })
    }

    /// Creates a tracker backed by a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: Mutex::new(init_in_memory()?),
        })
    }

    /// Returns the number of recorded targets
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM visited", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, target: &str) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO visited (target, visited_at) VALUES (?1, ?2)",
            params![target, now],
        )?;
        Ok(changed == 1)
    }
}

impl DuplicateTracker for SqliteDuplicateTracker {
    fn is_duplicate(&self, target: &str) -> bool {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM visited WHERE target = ?1",
                params![target],
                |_| Ok(()),
            )
            .optional();

        match found {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!("Failed to look up visited target {}: {}", target, e);
                true
            }
        }
    }

    fn mark_as_duplicate(&self, target: &str) {
        if let Err(e) = self.insert(target) {
            tracing::warn!("Failed to record visited target {}: {}", target, e);
        }
    }

    fn clear(&self) {
        if let Err(e) = self.conn().execute("DELETE FROM visited", []) {
            tracing::warn!("Failed to clear visited targets: {}", e);
        }
    }

    fn check_and_mark(&self, target: &str) -> bool {
        match self.insert(target) {
            Ok(inserted) => inserted,
            Err(e) => {
                tracing::warn!("Failed to record visited target {}: {}", target, e);
                false
            }
        }
    }
}
