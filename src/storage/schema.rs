//! Database schema definitions
//!
//! This module contains the SQL schema shared by the SQLite result store and
//! the SQLite duplicate tracker.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Extracted results, one JSON array per target
CREATE TABLE IF NOT EXISTS results (
    target TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

-- Targets already dispatched
CREATE TABLE IF NOT EXISTS visited (
    target TEXT PRIMARY KEY,
    visited_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database; every statement is idempotent.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
