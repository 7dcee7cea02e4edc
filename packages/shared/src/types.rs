//! Core domain types for the problemset catalog.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProblemRecord
// ---------------------------------------------------------------------------

/// A candidate catalog record extracted from one listing row.
///
/// Every field is extracted independently and fail-soft: a missing or
/// malformed sub-element leaves that field `None` (tags: empty) without
/// discarding the rest of the row. `name` is only present when both the
/// title and the numeral identifier extracted successfully; records without
/// a name are skipped by ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemRecord {
    /// Natural key: `title + " - " + numeral`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Difficulty rating; `None` when the listing shows no rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Number of participants who solved the problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solve_count: Option<i64>,
    /// Tag names attached to the problem (empty, not null, when absent).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Absolute URL of the problem page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Compose the natural key from a title and a numeral identifier.
///
/// Returns `None` unless both parts are present, so a partially extracted
/// row can never collide with a fully extracted one.
pub fn compose_name(title: Option<&str>, numeral: Option<&str>) -> Option<String> {
    match (title, numeral) {
        (Some(t), Some(n)) => Some(format!("{t} - {n}")),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CatalogRow
// ---------------------------------------------------------------------------

/// A query result row presented to the caller: name, rank, link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

// ---------------------------------------------------------------------------
// SearchFilters
// ---------------------------------------------------------------------------

/// Partial search criteria supplied by the caller.
///
/// `name` and `tag` are matched as substrings (tag exactly when it is the
/// primary dimension), `rank` exactly. All-`None` filters are invalid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.rank.is_none() && self.tag.is_none()
    }
}
