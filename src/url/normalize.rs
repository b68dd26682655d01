use crate::UrlError;
use url::Url;

/// Normalizes a discovered link against the crawl's base URL
///
/// # Normalization Steps
///
/// 1. Reject protocol-relative links (`//host/...`)
/// 2. Resolve root-relative links (`/path`) against the base URL's origin
/// 3. Reject `mailto:` links
/// 4. Reject anything containing `..`
/// 5. Parse the URL; reject if malformed (bare relative paths included)
/// 6. Reject URLs that do not contain the base URL's scope prefix
/// 7. Remove query string and fragment
/// 8. Collapse repeated `/` in the path
///
/// The scope test in step 6 is a substring test, not a host comparison, so
/// `https://other.com/?u=https://example.com` is accepted for a crawl of
/// `https://example.com`.
///
/// # Arguments
///
/// * `raw` - The href exactly as it appeared in the page
/// * `base` - The crawl's base URL
///
/// # Returns
///
/// * `Ok(Url)` - Normalized, in-scope URL
/// * `Err(UrlError)` - The reason the link was rejected
///
/// # Examples
///
/// ```
/// use shelob::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com").unwrap();
/// let url = normalize_url("/docs//intro?page=2#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/intro");
/// ```
pub fn normalize_url(raw: &str, base: &Url) -> Result<Url, UrlError> {
    if raw.starts_with("//") {
        return Err(UrlError::ProtocolRelative(raw.to_string()));
    }

    let resolved = if raw.starts_with('/') {
        format!("{}{}", base.origin().ascii_serialization(), raw)
    } else {
        raw.to_string()
    };

    if resolved.contains("mailto:") {
        return Err(UrlError::Mailto(raw.to_string()));
    }

    if resolved.contains("..") {
        return Err(UrlError::PathTraversal(raw.to_string()));
    }

    let mut url = Url::parse(&resolved).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if !resolved.contains(&scope_prefix(base)) {
        return Err(UrlError::OutOfScope(raw.to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);

    let path = collapse_slashes(url.path());
    url.set_path(&path);

    Ok(url)
}

/// Returns the string every in-scope URL must contain
///
/// This is the base URL without query or fragment. A bare origin also loses
/// the `/` that `Url` serializes it with, so `https://example.com` matches its
/// own links. A trailing `/` on a longer path is kept and narrows the scope.
pub fn scope_prefix(base: &Url) -> String {
    let mut scope = base.clone();
    scope.set_query(None);
    scope.set_fragment(None);

    let serialized = scope.as_str();
    if scope.path() == "/" {
        if let Some(origin) = serialized.strip_suffix('/') {
            return origin.to_string();
        }
    }

    serialized.to_string()
}

/// Collapses every run of `/` into a single separator
pub(crate) fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }

    collapsed
}
