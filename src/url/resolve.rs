use crate::url::normalize::normalize_link;
use crate::UrlError;
use url::Url;

/// Resolves a link found on a page against the page address
///
/// Standard relative-reference resolution applies: absolute links are kept,
/// `/path` attaches to the scheme and host of `base`, and path-relative links
/// attach to the directory of `base`. The result is normalized, so a pure
/// fragment link (`#top`) resolves to the normalized base itself.
///
/// # Arguments
///
/// * `base` - Absolute address of the page the link was found on
/// * `href` - Raw link value as it appears in the document
///
/// # Returns
///
/// * `Ok(String)` - The resolved, normalized address
/// * `Err(UrlError)` - `base` is not absolute or `href` cannot be joined
///
/// # Examples
///
/// ```
/// use fathom::url::resolve_link;
///
/// let base = "http://example.com/a/b";
/// assert_eq!(resolve_link(base, "c").unwrap(), "http://example.com/a/c");
/// assert_eq!(resolve_link(base, "/c").unwrap(), "http://example.com/c");
/// ```
pub fn resolve_link(base: &str, href: &str) -> Result<String, UrlError> {
    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    let resolved = resolve_against(&base_url, href)?;
    Ok(normalize_link(resolved.as_str()))
}

/// Joins `href` onto an already parsed base
pub(crate) fn resolve_against(base: &Url, href: &str) -> Result<Url, UrlError> {
    base.join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))
}
