//! HTML parser for extracting links and results
//!
//! This module handles parsing fetched content to extract:
//! - Links to follow (from `<a href>` tags), resolved, filtered and normalized
//! - A `page` result describing the document
//!
//! Parsers are pluggable through the [`Parser`] trait; [`HtmlParser`] is the
//! default.

use crate::crawler::page::{ExtractedResult, Page};
use crate::url::{is_candidate, is_followable, normalize_link, resolve_against};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

/// Errors a parser can report for one page
///
/// The engine never propagates these; a failed parse counts as a page with no
/// results and no links.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Page address is not absolute: {0}")]
    InvalidBase(String),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Everything a parser extracted from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub results: Vec<ExtractedResult>,

    /// Absolute, normalized, de-duplicated links in sorted order
    pub links: Vec<String>,
}

/// Extracts results and follow-up links from fetched pages
pub trait Parser: Send + Sync {
    fn parse(&self, page: &Page) -> Result<ParsedPage, ParseError>;
}

/// Default parser for HTML documents
#[derive(Debug, Clone, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Extracts all followable links from the document
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:** `<a href="...">` resolving to an http(s) address
    ///
    /// **Exclude:**
    /// - Empty and fragment-only links
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - Paths ending in a denylisted extension (images, archives, scripts, media)
    fn extract_links(&self, document: &Html, base: &Url) -> Vec<String> {
        let mut links = BTreeSet::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in document.select(&a_selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };

                if !is_candidate(href) {
                    continue;
                }

                let Ok(resolved) = resolve_against(base, href) else {
                    tracing::trace!("Skipping unresolvable link {} on {}", href, base);
                    continue;
                };

                if is_followable(&resolved) {
                    links.insert(normalize_link(resolved.as_str()));
                }
            }
        }

        links.into_iter().collect()
    }

    /// Builds the `page` result when the document has a title
    fn extract_results(&self, page: &Page, document: &Html) -> Vec<ExtractedResult> {
        let title = page
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| title_of(document));

        match title {
            Some(title) => vec![ExtractedResult::new("page")
                .with_field("url", page.target.clone())
                .with_field("title", title)
                .with_field("length", page.content.len())
                .with_field("timestamp", page.fetched_at)],
            None => Vec::new(),
        }
    }
}

impl Parser for HtmlParser {
    fn parse(&self, page: &Page) -> Result<ParsedPage, ParseError> {
        if page.content.is_empty() {
            return Ok(ParsedPage::default());
        }

        let base = Url::parse(&page.final_url)
            .map_err(|e| ParseError::InvalidBase(format!("{}: {}", page.final_url, e)))?;

        let html = String::from_utf8_lossy(&page.content);
        let document = Html::parse_document(&html);

        Ok(ParsedPage {
            results: self.extract_results(page, &document),
            links: self.extract_links(&document, &base),
        })
    }
}

/// Extracts the `<title>` of an HTML document
///
/// Returns `None` when the title is missing or blank.
pub fn extract_title(content: &[u8]) -> Option<String> {
    let html = String::from_utf8_lossy(content);
    title_of(&Html::parse_document(&html))
}

fn title_of(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
