use url::Url;

/// Path suffixes that never lead to crawlable documents
const DENIED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".pdf", ".zip", ".tar.gz", ".css", ".js", ".xml", ".json",
    ".mp3", ".mp4", ".avi", ".mov",
];

/// Link prefixes that are never resolved
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Checks a raw `href` before resolution
///
/// Rejects empty links, pure fragments, and pseudo-schemes such as
/// `javascript:` or `mailto:`.
pub fn is_candidate(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Returns true if the path ends with a denylisted extension
pub fn has_denied_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    DENIED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Checks a resolved link: http(s) only, no denylisted extension
pub fn is_followable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && !has_denied_extension(url.path())
}
