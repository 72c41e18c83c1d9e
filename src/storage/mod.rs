//! Storage module for persisting crawl data
//!
//! This module handles everything the crawl keeps beyond a single worker:
//! - The [`ResultStore`] trait and its in-memory and SQLite backings
//! - A SQLite-backed [`DuplicateTracker`](crate::state::DuplicateTracker)
//! - JSON export and import over any result store

mod export;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use export::{export_results, import_results};
pub use memory::MemoryResultStore;
pub use sqlite::{init_database, SqliteDuplicateTracker, SqliteResultStore};
pub use traits::{ResultStore, StorageError, StorageResult};
