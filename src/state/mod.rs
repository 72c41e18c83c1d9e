//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `EngineState`: Lifecycle of a crawl engine (idle, running, terminal)
//! - `DuplicateTracker`: Records visited targets so each is fetched at most once
//! - `MemoryDuplicateTracker`: Default in-memory tracker
//!
//! A persistent tracker lives in [`crate::storage::SqliteDuplicateTracker`].

mod engine_state;
mod visited;

// Re-export main types
pub use engine_state::EngineState;
pub use visited::{DuplicateTracker, MemoryDuplicateTracker};
