use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A successfully fetched document
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Address the page was fetched from
    pub target: String,

    /// Address the content was served from after redirects
    ///
    /// Relative links on the page resolve against this, not `target`.
    pub final_url: String,

    /// Document title, if the fetcher found one
    pub title: Option<String>,

    /// Raw response body
    pub content: Vec<u8>,

    pub status_code: u16,

    /// Response headers; the last value wins for repeated names
    pub headers: HashMap<String, String>,

    /// Declared character encoding, `utf-8` when none was declared
    pub charset: String,

    /// Unix timestamp (seconds) of the fetch
    pub fetched_at: i64,
}

impl Page {
    /// Creates a page with the given body and no metadata
    ///
    /// Mostly useful for fetchers that do not speak HTTP.
    pub fn new(target: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let target = target.into();
        Self {
            final_url: target.clone(),
            target,
            title: None,
            content: content.into(),
            status_code: 200,
            headers: HashMap::new(),
            charset: "utf-8".to_string(),
            fetched_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// One structured record extracted from a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedResult {
    /// What the record describes, e.g. `page`
    pub kind: String,

    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ExtractedResult {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Adds a field, replacing any previous value under `key`
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
