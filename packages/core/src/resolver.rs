//! Filter resolution: partial search criteria become either a result set or
//! a narrowing prompt.
//!
//! A single-dimension query (tag only, or rank only) that matches too many
//! rows is not dumped on the caller; instead the resolver answers with the
//! sorted values of the *other* dimension so the caller can narrow. A name
//! filter is treated as sufficiently user-directed to bypass the threshold,
//! as is a fully specified rank+tag conjunction.

use probcat_shared::{CatalogRow, Result, SearchFilters};
use probcat_storage::Storage;

/// Match-count boundary at or above which a single-dimension query returns
/// a narrowing prompt instead of direct rows.
pub const DISAMBIGUATION_THRESHOLD: usize = 20;

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// Canonical shape of a partial filter set. Each variant maps to exactly one
/// store query, keeping the resolution branching exhaustive and enumerable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// No usable filter at all.
    Empty,
    /// Name substring, optionally conjoined with an exact rank and/or a tag
    /// substring.
    Name {
        name: String,
        rank: Option<i64>,
        tag: Option<String>,
    },
    RankOnly(i64),
    TagOnly(String),
    RankAndTag { rank: i64, tag: String },
}

impl From<&SearchFilters> for FilterSpec {
    fn from(filters: &SearchFilters) -> Self {
        match (&filters.name, filters.rank, &filters.tag) {
            (Some(name), rank, tag) => Self::Name {
                name: name.clone(),
                rank,
                tag: tag.clone(),
            },
            (None, Some(rank), Some(tag)) => Self::RankAndTag {
                rank,
                tag: tag.clone(),
            },
            (None, Some(rank), None) => Self::RankOnly(rank),
            (None, None, Some(tag)) => Self::TagOnly(tag.clone()),
            (None, None, None) => Self::Empty,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving a filter set against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Direct matches: name, rank, link per row. Unordered.
    Rows(Vec<CatalogRow>),
    /// Too many matches; narrow along the offered dimension.
    Narrow(NarrowBy),
    /// The filters were usable but matched nothing.
    NotFound,
    /// No filter was supplied at all.
    InvalidFilters,
}

/// The dimension and sorted values offered when narrowing is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrowBy {
    /// Distinct non-null ranks among the matches, numerically ascending.
    Rank(Vec<i64>),
    /// Distinct tag names among the matches, lexicographically ascending.
    Tag(Vec<String>),
}

/// Resolve partial filters against the catalog (read-only).
pub async fn resolve(storage: &Storage, filters: &SearchFilters) -> Result<Resolution> {
    match FilterSpec::from(filters) {
        FilterSpec::Empty => Ok(Resolution::InvalidFilters),

        FilterSpec::TagOnly(tag) => {
            let rows = storage.search_by_tag(&tag).await?;
            if rows.is_empty() {
                Ok(Resolution::NotFound)
            } else if rows.len() < DISAMBIGUATION_THRESHOLD {
                Ok(Resolution::Rows(rows))
            } else {
                let ranks = storage.distinct_ranks_for_tag(&tag).await?;
                Ok(Resolution::Narrow(NarrowBy::Rank(ranks)))
            }
        }

        FilterSpec::RankOnly(rank) => {
            let rows = storage.search_by_rank(rank).await?;
            if rows.is_empty() {
                Ok(Resolution::NotFound)
            } else if rows.len() < DISAMBIGUATION_THRESHOLD {
                Ok(Resolution::Rows(rows))
            } else {
                let tags = storage.distinct_tags_for_rank(rank).await?;
                Ok(Resolution::Narrow(NarrowBy::Tag(tags)))
            }
        }

        // A two-dimensional filter is assumed selective enough to return
        // directly, whatever the match count.
        FilterSpec::RankAndTag { rank, tag } => {
            let rows = storage.search_by_rank_and_tag(rank, &tag).await?;
            if rows.is_empty() {
                Ok(Resolution::NotFound)
            } else {
                Ok(Resolution::Rows(rows))
            }
        }

        // A name filter never narrows.
        FilterSpec::Name { name, rank, tag } => {
            let rows = storage.search_by_name(&name, rank, tag.as_deref()).await?;
            if rows.is_empty() {
                Ok(Resolution::NotFound)
            } else {
                Ok(Resolution::Rows(rows))
            }
        }
    }
}

/// All distinct non-null ranks in the catalog, numerically ascending.
/// Used when presenting an initial choice menu.
pub async fn list_distinct_ranks(storage: &Storage) -> Result<Vec<i64>> {
    storage.distinct_ranks().await
}

/// All distinct tag names in the catalog, lexicographically ascending.
pub async fn list_distinct_tags(storage: &Storage) -> Result<Vec<String>> {
    storage.distinct_tags().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use probcat_shared::ProblemRecord;
    use uuid::Uuid;

    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("probcat_core_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    async fn seed(storage: &Storage, name: &str, rank: Option<i64>, tags: &[&str]) {
        let record = ProblemRecord {
            name: Some(name.into()),
            rank,
            solve_count: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            link: Some(format!("https://codeforces.com/p/{name}")),
        };
        storage.upsert_problem(&record).await.expect("seed record");
    }

    #[test]
    fn filter_spec_classification() {
        let spec = FilterSpec::from(&SearchFilters::default());
        assert_eq!(spec, FilterSpec::Empty);

        let spec = FilterSpec::from(&SearchFilters {
            rank: Some(800),
            tag: Some("dp".into()),
            ..Default::default()
        });
        assert_eq!(
            spec,
            FilterSpec::RankAndTag {
                rank: 800,
                tag: "dp".into()
            }
        );

        // Name takes precedence over everything else.
        let spec = FilterSpec::from(&SearchFilters {
            name: Some("Sum".into()),
            rank: Some(800),
            tag: None,
        });
        assert!(matches!(spec, FilterSpec::Name { .. }));
    }

    #[tokio::test]
    async fn empty_filters_are_invalid() {
        let storage = test_storage().await;
        let resolution = resolve(&storage, &SearchFilters::default()).await.unwrap();
        assert_eq!(resolution, Resolution::InvalidFilters);
    }

    #[tokio::test]
    async fn tag_below_threshold_returns_rows() {
        let storage = test_storage().await;
        for i in 0..19 {
            seed(&storage, &format!("Task {i} - {i}A"), Some(800 + i), &["dp"]).await;
        }

        let filters = SearchFilters {
            tag: Some("dp".into()),
            ..Default::default()
        };
        match resolve(&storage, &filters).await.unwrap() {
            Resolution::Rows(rows) => assert_eq!(rows.len(), 19),
            other => panic!("expected Rows, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tag_at_threshold_narrows_on_rank() {
        let storage = test_storage().await;
        // Ranks deliberately unsorted on insert; one unrated problem.
        for i in 0..19 {
            seed(
                &storage,
                &format!("Task {i} - {i}A"),
                Some(2000 - i * 50),
                &["dp"],
            )
            .await;
        }
        seed(&storage, "Unrated - 9Z", None, &["dp"]).await;

        let filters = SearchFilters {
            tag: Some("dp".into()),
            ..Default::default()
        };
        match resolve(&storage, &filters).await.unwrap() {
            Resolution::Narrow(NarrowBy::Rank(ranks)) => {
                assert_eq!(ranks.len(), 19); // null rank excluded
                let mut sorted = ranks.clone();
                sorted.sort_unstable();
                assert_eq!(ranks, sorted);
            }
            other => panic!("expected Narrow(Rank), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rank_at_threshold_narrows_on_tag() {
        let storage = test_storage().await;
        for i in 0..20 {
            let tag = format!("tag{:02}", 19 - i);
            seed(&storage, &format!("Task {i} - {i}B"), Some(800), &[&tag]).await;
        }

        let filters = SearchFilters {
            rank: Some(800),
            ..Default::default()
        };
        match resolve(&storage, &filters).await.unwrap() {
            Resolution::Narrow(NarrowBy::Tag(tags)) => {
                assert_eq!(tags.len(), 20);
                let mut sorted = tags.clone();
                sorted.sort();
                assert_eq!(tags, sorted);
            }
            other => panic!("expected Narrow(Tag), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rank_and_tag_never_narrows() {
        let storage = test_storage().await;
        for i in 0..25 {
            seed(&storage, &format!("Task {i} - {i}C"), Some(1200), &["graphs"]).await;
        }

        let filters = SearchFilters {
            rank: Some(1200),
            tag: Some("graphs".into()),
            ..Default::default()
        };
        match resolve(&storage, &filters).await.unwrap() {
            Resolution::Rows(rows) => assert_eq!(rows.len(), 25),
            other => panic!("expected Rows, got {other:?}"),
        }

        // Zero matches on the conjunction is NotFound, not InvalidFilters.
        let filters = SearchFilters {
            rank: Some(1200),
            tag: Some("strings".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve(&storage, &filters).await.unwrap(),
            Resolution::NotFound
        );
    }

    #[tokio::test]
    async fn name_filter_bypasses_threshold() {
        let storage = test_storage().await;
        for i in 0..50 {
            seed(&storage, &format!("Sum Task {i} - {i}D"), Some(900), &["math"]).await;
        }

        let filters = SearchFilters {
            name: Some("Sum".into()),
            ..Default::default()
        };
        match resolve(&storage, &filters).await.unwrap() {
            Resolution::Rows(rows) => assert_eq!(rows.len(), 50),
            other => panic!("expected Rows, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn name_conjoined_with_rank_and_tag() {
        let storage = test_storage().await;
        seed(&storage, "Two Sum - 4A", Some(1200), &["dp"]).await;
        seed(&storage, "Three Sum - 5B", Some(1500), &["dp"]).await;
        seed(&storage, "Other - 6C", Some(1200), &["dp"]).await;

        let filters = SearchFilters {
            name: Some("Sum".into()),
            rank: Some(1200),
            tag: Some("dp".into()),
        };
        match resolve(&storage, &filters).await.unwrap() {
            Resolution::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].name, "Two Sum - 4A");
            }
            other => panic!("expected Rows, got {other:?}"),
        }

        let filters = SearchFilters {
            name: Some("Nope".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve(&storage, &filters).await.unwrap(),
            Resolution::NotFound
        );
    }

    #[tokio::test]
    async fn distinct_menus_are_sorted() {
        let storage = test_storage().await;
        seed(&storage, "A - 1A", Some(1500), &["greedy"]).await;
        seed(&storage, "B - 1B", Some(800), &["dp"]).await;

        assert_eq!(list_distinct_ranks(&storage).await.unwrap(), vec![800, 1500]);
        assert_eq!(
            list_distinct_tags(&storage).await.unwrap(),
            vec!["dp".to_string(), "greedy".to_string()]
        );
    }
}
