//! Output module for reporting crawl results
//!
//! This module handles:
//! - Rendering and printing the run summary
//!
//! Result files are written by [`crate::storage::export_results`].

pub mod stats;

pub use stats::{format_statistics, print_statistics, RunSummary};
