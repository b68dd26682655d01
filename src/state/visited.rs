use dashmap::DashSet;
use std::sync::Arc;

/// Set of normalized URLs already scheduled during a crawl
///
/// Cloning yields another handle to the same set. Claiming is the only
/// deduplication gate of the crawler: a URL must be claimed before it is put
/// on the frontier.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: Arc<DashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for scheduling
    ///
    /// Returns `true` for exactly one caller per URL, however many tasks race
    /// on it; every later call returns `false`.
    pub fn try_claim(&self, normalized: &str) -> bool {
        self.urls.insert(normalized.to_string())
    }

    /// Returns whether the URL has been claimed
    pub fn contains(&self, normalized: &str) -> bool {
        self.urls.contains(normalized)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
