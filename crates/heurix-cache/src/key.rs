//! Cache key normalization.

use std::fmt::Write;

use url::Url;

/// Normalize a page URL into a cache key.
///
/// Keeps scheme, host, port, path without trailing slash, query and fragment.
/// Fragments and tracking parameters are not stripped, so `page#a` and `page#b`
/// are distinct keys. Unparseable input is only trimmed.
pub fn cache_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let url = match Url::parse(trimmed) {
        Ok(url) if url.has_host() => url,
        _ => return trimmed.trim_end_matches('/').to_string(),
    };

    let mut key = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        let _ = write!(key, ":{port}");
    }
    key.push_str(url.path().trim_end_matches('/'));
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(query);
    }
    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        key.push('#');
        key.push_str(fragment);
    }
    key
}
