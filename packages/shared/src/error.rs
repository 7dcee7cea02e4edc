//! Error types for probcat.
//!
//! Library crates use [`ProbcatError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! End-of-catalog is deliberately not an error: the paginator signals it as
//! `Ok(None)` so callers can tell "done" from "failed" (a fetch error).

use std::path::PathBuf;

/// Top-level error type for all probcat operations.
#[derive(Debug, thiserror::Error)]
pub enum ProbcatError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/timeout/non-2xx failure while fetching a listing page.
    /// Aborts the current sweep; the next scheduled sweep retries from page one.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProbcatError>;

impl ProbcatError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
