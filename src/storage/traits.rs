//! Storage traits and error types
//!
//! This module defines the trait interface for result store backends and
//! associated error types.

use crate::crawler::ExtractedResult;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for result store implementations
///
/// Results are keyed by target. Implementations guard their own state and
/// must accept `store` from many workers at once; concurrent calls for
/// different targets never interfere, and a call for the same target replaces
/// the whole sequence atomically.
pub trait ResultStore: Send + Sync {
    /// Stores the results extracted from `target`, replacing any previous entry
    fn store(&self, target: &str, results: Vec<ExtractedResult>) -> StorageResult<()>;

    /// Gets the results stored for `target`
    fn get(&self, target: &str) -> StorageResult<Option<Vec<ExtractedResult>>>;

    /// Returns a point-in-time copy of every stored entry
    fn get_all(&self) -> StorageResult<HashMap<String, Vec<ExtractedResult>>>;

    /// Removes every stored entry
    fn clear(&self) -> StorageResult<()>;

    /// Returns the number of targets with stored results
    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
