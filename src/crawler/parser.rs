//! HTML parser for extracting links
//!
//! Every `href` of every `<a>` element is returned exactly as written, in
//! document order. Filtering and resolution are left to URL normalization.

use crate::ShelobError;
use scraper::{Html, Selector};

/// Parses fetched content into raw hrefs
pub trait LinkExtractor: Send + Sync {
    /// Returns the raw href values found in `content`, in document order
    fn extract(&self, content: &str) -> Result<Vec<String>, ShelobError>;
}

/// Link extractor for HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, content: &str) -> Result<Vec<String>, ShelobError> {
        extract_links(content)
    }
}

/// Extracts all anchor hrefs from an HTML document
///
/// Tag and attribute names match case-insensitively. Hrefs are not trimmed,
/// resolved or filtered.
///
/// # Example
///
/// ```
/// use shelob::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// assert_eq!(extract_links(html).unwrap(), vec!["/page".to_string()]);
/// ```
pub fn extract_links(html: &str) -> Result<Vec<String>, ShelobError> {
    let document = Html::parse_document(html);

    let selector = Selector::parse("a[href]").map_err(|e| ShelobError::HtmlParse {
        message: e.to_string(),
    })?;

    // select() walks the tree depth-first in document order
    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect())
}
