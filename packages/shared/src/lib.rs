//! Shared types, error model, and configuration for probcat.
//!
//! This crate is the foundation depended on by all other probcat crates.
//! It provides:
//! - [`ProbcatError`] — the unified error type
//! - Domain types ([`ProblemRecord`], [`CatalogRow`], [`SearchFilters`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ListingConfig, StorageConfig, SweepConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{ProbcatError, Result};
pub use types::{CatalogRow, ProblemRecord, SearchFilters, compose_name};
