//! State module for tracking crawl progress
//!
//! This module holds the shared, concurrency-safe state of one crawl run.
//!
//! # Components
//!
//! - `VisitedSet`: Claims each normalized URL exactly once
//! - `PendingCounter`: Outstanding work; zero means the crawl is complete
//! - `PoolState`: Lifecycle of the worker pool
//! - `PageOutcome`: How processing of a single URL ended
//!
//! None of this is persisted. Resuming a crawl relies on the content store.

mod page_outcome;
mod pending;
mod pool_state;
mod visited;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use pending::{PendingCounter, PendingGuard};
pub use pool_state::PoolState;
pub use visited::VisitedSet;
