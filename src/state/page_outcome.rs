use std::fmt;

/// How the processing of a single URL ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// Fetched over the network and written to the store
    Fetched,

    /// Content loaded from the store instead of fetching (resume mode)
    Resumed,

    /// Fetch, store or parse failed; the URL is dropped without retry
    Failed,
}

impl PageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Resumed => "resumed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
