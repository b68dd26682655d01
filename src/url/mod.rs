//! URL handling module for Shelob
//!
//! This module turns raw hrefs into canonical in-scope URLs and maps those
//! URLs onto content store paths. Both operations are pure: they depend only
//! on their arguments and never on crawl state.

mod normalize;
mod path;

// Re-export main functions
pub use normalize::{normalize_url, scope_prefix};
pub use path::store_path;
