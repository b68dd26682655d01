//! Crawl frontier
//!
//! The frontier decouples workers that discover links from workers that need
//! the next URL to fetch. It is unbounded because the number of links found
//! mid-crawl is unknown, and it has an explicit close so the worker pool can
//! release every waiting worker once the crawl is over.

mod unbounded;

pub use unbounded::Frontier;
