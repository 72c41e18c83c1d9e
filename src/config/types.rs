use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default maximum crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default number of concurrent fetches
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default global timeout for a whole run
pub const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default timeout for a single request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between two dispatches
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Configuration file structure for Fathom
///
/// Every section is optional; missing values fall back to the crawl defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed addresses, crawled at depth 0
    pub seeds: Vec<String>,

    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,

    /// Extra request headers sent with every fetch
    pub headers: BTreeMap<String, String>,

    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from seed URLs
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches
    pub concurrency: usize,

    /// Upper bound for the whole run in seconds (0 = unbounded)
    #[serde(rename = "global-timeout-secs")]
    pub global_timeout_secs: u64,

    /// Timeout for a single request in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Delay between two dispatches in milliseconds
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            global_timeout_secs: DEFAULT_GLOBAL_TIMEOUT.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            request_delay_ms: DEFAULT_REQUEST_DELAY.as_millis() as u64,
            respect_robots: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: `Name/Version`, followed by ` (+ContactURL; ContactEmail)` when
    /// any contact detail is configured.
    pub fn to_header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON results export
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// SQLite database backing the result store and duplicate tracker
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: "results.json".to_string(),
            database_path: None,
        }
    }
}

/// Options controlling a single crawl run
///
/// Immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOptions {
    /// Records deeper than this are never fetched
    pub max_depth: u32,

    /// Maximum number of fetches in flight at once
    pub concurrency: usize,

    /// Bound for the whole run; `Duration::ZERO` means unbounded
    pub global_timeout: Duration,

    pub per_request_timeout: Duration,

    /// Pause applied by the dispatch loop before every dispatch
    pub request_delay: Duration,

    /// Carried for callers; the engine does not consult robots.txt
    pub respect_robots: bool,

    /// Headers passed to every fetch unmodified
    pub headers: BTreeMap<String, String>,

    pub user_agent: String,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            global_timeout: DEFAULT_GLOBAL_TIMEOUT,
            per_request_timeout: DEFAULT_REQUEST_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            respect_robots: true,
            headers: BTreeMap::new(),
            user_agent: UserAgentConfig::default().to_header_value(),
        }
    }
}

impl Config {
    /// Builds the run options described by this configuration
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_depth: self.crawler.max_depth,
            concurrency: self.crawler.concurrency,
            global_timeout: Duration::from_secs(self.crawler.global_timeout_secs),
            per_request_timeout: Duration::from_secs(self.crawler.request_timeout_secs),
            request_delay: Duration::from_millis(self.crawler.request_delay_ms),
            respect_robots: self.crawler.respect_robots,
            headers: self.headers.clone(),
            user_agent: self.user_agent.to_header_value(),
        }
    }
}
