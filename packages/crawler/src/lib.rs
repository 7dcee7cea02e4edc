//! Listing crawler for probcat.
//!
//! Sequential page fetching ([`fetch`]) and per-row record extraction
//! ([`extract`]). The sweep in `probcat-core` drives both.

pub mod extract;
pub mod fetch;

pub use extract::extract_records;
pub use fetch::{ListingPage, PageFetcher, Paginator, find_next_page};
