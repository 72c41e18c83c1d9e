use crate::UrlError;
use url::Url;

/// Normalizes a discovered link for deduplication
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything after `#`)
/// 2. Remove a single trailing slash
///
/// Nothing else is touched: scheme, host casing, and query are kept exactly as
/// resolution produced them, so two links only collapse when they differ in
/// fragment or trailing slash.
///
/// # Examples
///
/// ```
/// use fathom::url::normalize_link;
///
/// assert_eq!(normalize_link("http://example.com/page/#top"), "http://example.com/page");
/// ```
pub fn normalize_link(link: &str) -> String {
    let without_fragment = match link.find('#') {
        Some(pos) => &link[..pos],
        None => link,
    };

    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

/// Validates a seed address
///
/// The path is kept as given, trailing slash included, since that is the
/// address the server is asked for. Only the fragment is dropped. Use
/// [`normalize_link`] on the result to get its deduplication key.
///
/// # Arguments
///
/// * `target` - The address supplied by the caller
///
/// # Returns
///
/// * `Ok(String)` - Absolute address to fetch
/// * `Err(UrlError)` - The address is malformed, not http(s), or has no host
pub fn parse_seed(target: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(target.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", target, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(target.to_string()));
    }

    url.set_fragment(None);
    Ok(url.into())
}
