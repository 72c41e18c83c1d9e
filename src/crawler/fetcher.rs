//! HTTP fetcher implementation
//!
//! This module handles all network access for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - Sending every configured header with each request
//! - Classifying failures into [`FetchError`]
//! - Collecting page metadata (title, headers, charset)
//!
//! The engine only depends on the [`Fetcher`] trait, so tests and other
//! transports can provide their own implementation.

use crate::config::CrawlOptions;
use crate::crawler::page::Page;
use crate::crawler::parser::extract_title;
use crate::{ConfigError, CrawlError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;

/// Time allowed for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Charset reported when neither the headers nor the document declare one
const DEFAULT_CHARSET: &str = "utf-8";

/// How far into the document a `charset=` value may extend
const MAX_CHARSET_LEN: usize = 20;

/// Reasons a fetch can fail
///
/// The engine treats every variant the same way: the address counts as
/// failed and is not retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build request: {0}")]
    Request(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Failed to read body: {0}")]
    Read(String),
}

/// Retrieves the content behind an address
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `target`, giving up once `timeout` has elapsed
    async fn fetch(&self, target: &str, timeout: Duration) -> Result<Page, FetchError>;
}

/// Default fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,

    /// Sent with every request; these win over the client's user agent
    headers: HeaderMap,
}

impl HttpFetcher {
    /// Builds a fetcher from run options
    ///
    /// # Arguments
    ///
    /// * `options` - Supplies the user agent and the custom headers
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Ready to use fetcher
    /// * `Err(CrawlError)` - A header is invalid or the client could not be built
    pub fn new(options: &CrawlOptions) -> Result<Self, CrawlError> {
        let client = build_http_client(&options.user_agent)?;
        let headers = build_header_map(&options.headers)?;
        Ok(Self { client, headers })
    }

    /// Wraps an existing client; no extra headers are sent
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy. Per-request timeouts are set on
/// each request by [`HttpFetcher::fetch`].
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::InvalidHeader(format!("'{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ConfigError::InvalidHeader(format!("value of '{}': {}", name, e)))?;
        map.insert(name, value);
    }

    Ok(map)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str, timeout: Duration) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(target)
            .headers(self.headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut headers = HashMap::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let content = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Read(e.to_string())
            }
        })?;
        let content = content.to_vec();

        Ok(Page {
            target: target.to_string(),
            final_url,
            title: extract_title(&content),
            charset: detect_charset(content_type.as_deref(), &content),
            status_code: status.as_u16(),
            headers,
            content,
            fetched_at: chrono::Utc::now().timestamp(),
        })
    }
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_builder() {
        FetchError::Request(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Detects the declared character encoding of a response
///
/// Looks at the `charset=` parameter of the Content-Type header first, then
/// at the first `charset=` declaration inside the document.
pub fn detect_charset(content_type: Option<&str>, content: &[u8]) -> String {
    if let Some(charset) = content_type.and_then(charset_from_content_type) {
        return charset;
    }

    charset_from_document(content).unwrap_or_else(|| DEFAULT_CHARSET.to_string())
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    let start = content_type.find("charset=")? + "charset=".len();
    let charset = content_type[start..]
        .split(|c: char| c == ';' || c == ' ')
        .next()?
        .trim_matches('"');

    (!charset.is_empty()).then(|| charset.to_string())
}

fn charset_from_document(content: &[u8]) -> Option<String> {
    let needle = b"charset=";
    let start = content
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))?
        + needle.len();

    let rest = &content[start..];
    let rest = rest
        .strip_prefix(b"\"")
        .or_else(|| rest.strip_prefix(b"'"))
        .unwrap_or(rest);

    let value: Vec<u8> = rest
        .iter()
        .take(MAX_CHARSET_LEN)
        .take_while(|&&b| !matches!(b, b'"' | b'\'' | b' ' | b';' | b'>' | b'/'))
        .copied()
        .collect();

    if value.is_empty() {
        return None;
    }

    String::from_utf8(value).ok()
}
