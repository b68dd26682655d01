//! Output module for crawl reporting
//!
//! Pages themselves are written through the storage module; this module
//! covers the statistics reported at the end of a crawl.

mod stats;

pub use stats::{log_summary, CrawlStats, CrawlSummary};
