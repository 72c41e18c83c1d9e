//! Crawl statistics
//!
//! Every worker updates the same counters, so they live behind one mutex and
//! readers only ever see consistent point-in-time snapshots.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counters describing a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Records handed to a worker
    pub urls_processed: u64,

    /// Fetches that returned a page
    pub pages_succeeded: u64,

    /// Fetches that returned an error or timed out
    pub pages_failed: u64,

    /// Links reported by the parser, before deduplication
    pub urls_found: u64,

    /// Message of the most recent fetch failure
    pub last_error: Option<String>,
}

impl CrawlStats {
    /// Fetches that have finished, successfully or not
    pub fn pages_finished(&self) -> u64 {
        self.pages_succeeded + self.pages_failed
    }

    /// Share of finished fetches that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        let finished = self.pages_finished();
        if finished == 0 {
            0.0
        } else {
            (self.pages_succeeded as f64 / finished as f64) * 100.0
        }
    }
}

/// Shared recorder workers report into
#[derive(Debug, Default)]
pub struct StatsRecorder {
    stats: Mutex<CrawlStats>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CrawlStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_processed(&self) {
        self.lock().urls_processed += 1;
    }

    pub fn record_success(&self) {
        self.lock().pages_succeeded += 1;
    }

    pub fn record_failure(&self, error: impl Into<String>) {
        let mut stats = self.lock();
        stats.pages_failed += 1;
        stats.last_error = Some(error.into());
    }

    pub fn record_found(&self, count: usize) {
        self.lock().urls_found += count as u64;
    }

    /// Returns a copy of the current counters
    pub fn snapshot(&self) -> CrawlStats {
        self.lock().clone()
    }
}
