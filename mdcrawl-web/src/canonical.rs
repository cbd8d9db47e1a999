use url::Url;

const SKIPPED_PREFIXES: [&str; 5] = ["javascript:", "mailto:", "tel:", "data:", "#"];

/// Resolves `href` against `base` (or parses it as absolute when there is no base)
/// and normalizes it into the identity used for deduplication.
///
/// Scheme and host are lowercased by the `url` crate, default ports dropped and
/// dot segments removed. On top of that the fragment is stripped, an empty query
/// is removed and a trailing slash is dropped from any non-root path. Only http
/// and https references are accepted.
pub fn canonicalize(base: Option<&Url>, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
        return None;
    }

    let mut url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        let trimmed = if trimmed.is_empty() { "/".to_string() } else { trimmed };
        url.set_path(&trimmed);
    }

    Some(url)
}

/// String form of [`canonicalize`], used as the node id.
pub fn canonical_id(base: Option<&Url>, href: &str) -> Option<String> {
    canonicalize(base, href).map(String::from)
}

/// Lowercased host of a canonical URL.
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(str::to_ascii_lowercase)
}
