//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML parsing and link extraction behind the [`Parser`] trait
//! - Run statistics
//! - The [`Engine`] that coordinates them

mod engine;
mod fetcher;
mod page;
mod parser;
mod stats;

pub use engine::{CrawlOutcome, Engine};
pub use fetcher::{build_http_client, detect_charset, FetchError, Fetcher, HttpFetcher};
pub use page::{ExtractedResult, Page};
pub use parser::{extract_title, HtmlParser, ParseError, ParsedPage, Parser};
pub use stats::{CrawlStats, StatsRecorder};
