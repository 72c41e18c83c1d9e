//! Run summary rendering
//!
//! This module turns the statistics of a finished run into the
//! human-readable report printed by the command-line tool.

use crate::crawler::{CrawlOutcome, CrawlStats};
use std::fmt::Write;
use std::time::Duration;

/// Everything reported about a finished run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: CrawlOutcome,
    pub stats: CrawlStats,

    /// Number of targets with stored results
    pub stored_targets: usize,

    pub elapsed: Duration,
}

/// Renders a summary as plain text
pub fn format_statistics(summary: &RunSummary) -> String {
    let stats = &summary.stats;
    let mut out = String::new();

    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Outcome: {}", summary.outcome);
    let _ = writeln!(out, "  Duration: {:.1}s", summary.elapsed.as_secs_f64());
    let _ = writeln!(out, "  URLs processed: {}", stats.urls_processed);
    let _ = writeln!(
        out,
        "  Pages succeeded: {} ({:.1}%)",
        stats.pages_succeeded,
        stats.success_rate()
    );
    let _ = writeln!(out, "  Pages failed: {}", stats.pages_failed);
    let _ = writeln!(out, "  Links found: {}", stats.urls_found);
    let _ = writeln!(out, "  Targets with results: {}", summary.stored_targets);

    if let Some(error) = &stats.last_error {
        let _ = writeln!(out);
        let _ = writeln!(out, "Last error:");
        let _ = writeln!(out, "  {}", error);
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(summary: &RunSummary) {
    print!("{}", format_statistics(summary));
}
