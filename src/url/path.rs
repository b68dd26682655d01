use super::normalize::collapse_slashes;
use std::path::PathBuf;
use url::Url;

/// Derives the on-disk location for a crawled URL
///
/// The path is `download_path + host[:port] + url path` with repeated
/// separators collapsed. When the last path segment has no `.` in it the URL
/// is treated as a directory and `index.html` is appended.
///
/// # Examples
///
/// ```
/// use shelob::url::store_path;
/// use std::path::PathBuf;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/page1").unwrap();
/// assert_eq!(
///     store_path("./downloads/", &url),
///     PathBuf::from("./downloads/example.com/page1/index.html")
/// );
/// ```
pub fn store_path(download_path: &str, url: &Url) -> PathBuf {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let raw = collapse_slashes(&format!("{}{}/{}", download_path, host, url.path()));

    let last_segment = raw.rsplit('/').next().unwrap_or("");
    if last_segment.contains('.') {
        return PathBuf::from(raw);
    }

    PathBuf::from(collapse_slashes(&format!("{}/index.html", raw)))
}
