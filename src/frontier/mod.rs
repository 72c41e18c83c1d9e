//! Crawl frontier for Fathom
//!
//! The frontier holds address records waiting to be dispatched. The engine
//! only depends on the [`FrontierQueue`] trait, so ordering strategies can be
//! swapped freely:
//! - [`FifoQueue`]: insertion order, giving breadth-first discipline
//! - [`DepthPriorityQueue`]: shallowest depth first, ties by insertion order

mod fifo;
mod priority;

pub use fifo::FifoQueue;
pub use priority::DepthPriorityQueue;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The atomic unit of crawl work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Absolute address to fetch
    pub target: String,

    /// Distance from the seed this record descends from
    pub depth: u32,

    /// Address of the page that linked here (None for seeds)
    pub origin: Option<String>,

    /// Free-form data carried along with the record
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AddressRecord {
    /// Creates a depth-0 record with no origin
    pub fn seed(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            depth: 0,
            origin: None,
            metadata: HashMap::new(),
        }
    }

    /// Creates a record for a link discovered on this record's page
    pub fn child(&self, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            depth: self.depth + 1,
            origin: Some(self.target.clone()),
            metadata: HashMap::new(),
        }
    }

    /// Attaches a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Queue of pending address records
///
/// Implementations must accept `push` from many tasks at once; `pop` is only
/// called by the dispatch loop.
pub trait FrontierQueue: Send + Sync {
    /// Adds a record to the queue
    fn push(&self, record: AddressRecord);

    /// Removes and returns the next record, if any
    fn pop(&self) -> Option<AddressRecord>;

    /// Returns the number of queued records
    fn len(&self) -> usize;

    /// Returns whether the queue is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every queued record
    fn clear(&self);
}
