//! Configuration module for Fathom
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning them into the [`CrawlOptions`] an engine runs with.
//!
//! # Example
//!
//! ```no_run
//! use fathom::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fathom.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlOptions, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_CONCURRENCY,
    DEFAULT_GLOBAL_TIMEOUT, DEFAULT_MAX_DEPTH, DEFAULT_REQUEST_DELAY, DEFAULT_REQUEST_TIMEOUT,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate_options, MAX_CONCURRENCY};

impl CrawlOptions {
    /// Checks that these options can drive an engine
    pub fn validate(&self) -> crate::ConfigResult<()> {
        validate_options(self)
    }
}
