//! Catalog ingestion and query resolution for probcat.
//!
//! - [`sweep`] — the crawl-and-ingest sweep and the periodic scheduler
//! - [`resolver`] — partial-criteria queries with automatic disambiguation

pub mod resolver;
pub mod sweep;

pub use resolver::{
    DISAMBIGUATION_THRESHOLD, FilterSpec, NarrowBy, Resolution, list_distinct_ranks,
    list_distinct_tags, resolve,
};
pub use sweep::{SweepReport, Sweeper, run_scheduler};
