//! libSQL catalog store.
//!
//! The [`Storage`] struct wraps a libSQL database holding the deduplicated
//! problem catalog: problems, tags, their associations, and sweep history.
//!
//! **Access rules:**
//! - The ingestion sweep is the sole writer, via [`Storage::open`]
//! - Query-side consumers may use [`Storage::open_readonly`] and run
//!   concurrently with an in-progress sweep (reads may observe a partially
//!   ingested sweep; ingestion is idempotent, so this is benign)

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use uuid::Uuid;

use probcat_shared::{CatalogRow, ProblemRecord, ProbcatError, Result};

/// Outcome of one record upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new problem row was inserted.
    Inserted,
    /// The natural key already existed; the row was left untouched
    /// (first write wins) but associations were still reconciled.
    AlreadyKnown,
    /// The record had no composable name and was not ingested.
    Skipped,
}

/// Primary storage handle wrapping a libSQL database.
#[derive(Debug)]
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProbcatError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode (for query-side consumers).
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    ProbcatError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(ProbcatError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Upsert
    // -----------------------------------------------------------------------

    /// Idempotent upsert of one extracted record.
    ///
    /// Nameless records are skipped. A known natural key is a no-op for the
    /// problem row itself (its rank/solve_count/link are never updated), but
    /// tag get-or-create and association inserts are (re)attempted on every
    /// sweep, so a crash between inserting a problem and its associations
    /// heals on the next re-ingestion of the same record.
    pub async fn upsert_problem(&self, record: &ProblemRecord) -> Result<UpsertOutcome> {
        self.check_writable()?;

        let Some(name) = record.name.as_deref() else {
            tracing::debug!("record without a composable name, skipping");
            return Ok(UpsertOutcome::Skipped);
        };

        let (problem_id, outcome) = match self.problem_id_by_name(name).await? {
            Some(id) => (id, UpsertOutcome::AlreadyKnown),
            None => {
                // OR IGNORE: the UNIQUE constraint is the backstop if the
                // existence check above was ever bypassed.
                self.conn
                    .execute(
                        "INSERT OR IGNORE INTO problems (name, rank, solve_count, link)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![name, record.rank, record.solve_count, record.link.as_deref()],
                    )
                    .await
                    .map_err(|e| ProbcatError::Storage(e.to_string()))?;

                // Deterministic identity resolution under the single-writer
                // assumption: re-select by the natural key.
                let id = self.problem_id_by_name(name).await?.ok_or_else(|| {
                    ProbcatError::Storage(format!("problem `{name}` missing after insert"))
                })?;
                (id, UpsertOutcome::Inserted)
            }
        };

        for tag in &record.tags {
            let tag_id = self.tag_id_or_create(tag).await?;
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO problem_tags (problem_id, tag_id) VALUES (?1, ?2)",
                    params![problem_id, tag_id],
                )
                .await
                .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        }

        Ok(outcome)
    }

    async fn problem_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let mut rows = self
            .conn
            .query("SELECT id FROM problems WHERE name = ?1", params![name])
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(
                row.get::<i64>(0)
                    .map_err(|e| ProbcatError::Storage(e.to_string()))?,
            )),
            Ok(None) => Ok(None),
            Err(e) => Err(ProbcatError::Storage(e.to_string())),
        }
    }

    async fn tag_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let mut rows = self
            .conn
            .query("SELECT id FROM tags WHERE name = ?1", params![name])
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(
                row.get::<i64>(0)
                    .map_err(|e| ProbcatError::Storage(e.to_string()))?,
            )),
            Ok(None) => Ok(None),
            Err(e) => Err(ProbcatError::Storage(e.to_string())),
        }
    }

    /// Get-or-create a tag by name. Sequential and single-writer, so the
    /// select/insert/re-select sequence cannot race.
    async fn tag_id_or_create(&self, name: &str) -> Result<i64> {
        if let Some(id) = self.tag_id_by_name(name).await? {
            return Ok(id);
        }
        self.conn
            .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![name])
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        self.tag_id_by_name(name)
            .await?
            .ok_or_else(|| ProbcatError::Storage(format!("tag `{name}` missing after insert")))
    }

    // -----------------------------------------------------------------------
    // Read queries — one per filter shape
    // -----------------------------------------------------------------------

    /// All problems carrying exactly the given tag.
    pub async fn search_by_tag(&self, tag: &str) -> Result<Vec<CatalogRow>> {
        let rows = self
            .conn
            .query(
                "SELECT p.name, p.rank, p.link
                 FROM problems p
                 JOIN problem_tags pt ON pt.problem_id = p.id
                 JOIN tags t ON t.id = pt.tag_id
                 WHERE t.name = ?1",
                params![tag],
            )
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        collect_rows(rows).await
    }

    /// All problems with exactly the given rank.
    pub async fn search_by_rank(&self, rank: i64) -> Result<Vec<CatalogRow>> {
        let rows = self
            .conn
            .query(
                "SELECT name, rank, link FROM problems WHERE rank = ?1",
                params![rank],
            )
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        collect_rows(rows).await
    }

    /// Conjunction of an exact rank and an exact tag.
    pub async fn search_by_rank_and_tag(&self, rank: i64, tag: &str) -> Result<Vec<CatalogRow>> {
        let rows = self
            .conn
            .query(
                "SELECT p.name, p.rank, p.link
                 FROM problems p
                 JOIN problem_tags pt ON pt.problem_id = p.id
                 JOIN tags t ON t.id = pt.tag_id
                 WHERE p.rank = ?1 AND t.name = ?2",
                params![rank, tag],
            )
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        collect_rows(rows).await
    }

    /// Name-substring search, optionally conjoined with an exact rank and a
    /// tag substring. Joins are only introduced when a tag filter is present,
    /// with DISTINCT to dedup problems matched through multiple tags.
    pub async fn search_by_name(
        &self,
        name: &str,
        rank: Option<i64>,
        tag: Option<&str>,
    ) -> Result<Vec<CatalogRow>> {
        let name_pat = format!("%{name}%");
        let rows = match (rank, tag) {
            (None, None) => self
                .conn
                .query(
                    "SELECT name, rank, link FROM problems WHERE name LIKE ?1",
                    params![name_pat.as_str()],
                )
                .await,
            (Some(rank), None) => self
                .conn
                .query(
                    "SELECT name, rank, link FROM problems
                     WHERE name LIKE ?1 AND rank = ?2",
                    params![name_pat.as_str(), rank],
                )
                .await,
            (None, Some(tag)) => {
                let tag_pat = format!("%{tag}%");
                self.conn
                    .query(
                        "SELECT DISTINCT p.name, p.rank, p.link
                         FROM problems p
                         JOIN problem_tags pt ON pt.problem_id = p.id
                         JOIN tags t ON t.id = pt.tag_id
                         WHERE p.name LIKE ?1 AND t.name LIKE ?2",
                        params![name_pat.as_str(), tag_pat.as_str()],
                    )
                    .await
            }
            (Some(rank), Some(tag)) => {
                let tag_pat = format!("%{tag}%");
                self.conn
                    .query(
                        "SELECT DISTINCT p.name, p.rank, p.link
                         FROM problems p
                         JOIN problem_tags pt ON pt.problem_id = p.id
                         JOIN tags t ON t.id = pt.tag_id
                         WHERE p.name LIKE ?1 AND t.name LIKE ?2 AND p.rank = ?3",
                        params![name_pat.as_str(), tag_pat.as_str(), rank],
                    )
                    .await
            }
        }
        .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        collect_rows(rows).await
    }

    /// All distinct non-null ranks, numerically ascending.
    pub async fn distinct_ranks(&self) -> Result<Vec<i64>> {
        self.collect_ranks(
            "SELECT DISTINCT rank FROM problems WHERE rank IS NOT NULL ORDER BY rank",
            params![],
        )
        .await
    }

    /// Distinct non-null ranks among problems carrying the given tag,
    /// numerically ascending.
    pub async fn distinct_ranks_for_tag(&self, tag: &str) -> Result<Vec<i64>> {
        self.collect_ranks(
            "SELECT DISTINCT p.rank
             FROM problems p
             JOIN problem_tags pt ON pt.problem_id = p.id
             JOIN tags t ON t.id = pt.tag_id
             WHERE t.name = ?1 AND p.rank IS NOT NULL
             ORDER BY p.rank",
            params![tag],
        )
        .await
    }

    /// All distinct tag names, lexicographically ascending.
    pub async fn distinct_tags(&self) -> Result<Vec<String>> {
        self.collect_names("SELECT name FROM tags ORDER BY name", params![])
            .await
    }

    /// Distinct tag names among problems of the given rank, lexicographically
    /// ascending.
    pub async fn distinct_tags_for_rank(&self, rank: i64) -> Result<Vec<String>> {
        self.collect_names(
            "SELECT DISTINCT t.name
             FROM problems p
             JOIN problem_tags pt ON pt.problem_id = p.id
             JOIN tags t ON t.id = pt.tag_id
             WHERE p.rank = ?1
             ORDER BY t.name",
            params![rank],
        )
        .await
    }

    async fn collect_ranks(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<i64>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(
                row.get::<i64>(0)
                    .map_err(|e| ProbcatError::Storage(e.to_string()))?,
            );
        }
        Ok(results)
    }

    async fn collect_names(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(
                row.get::<String>(0)
                    .map_err(|e| ProbcatError::Storage(e.to_string()))?,
            );
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Sweep history
    // -----------------------------------------------------------------------

    /// Insert a new sweep record. Returns the generated sweep ID.
    pub async fn insert_sweep(&self) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO sweeps (id, started_at) VALUES (?1, ?2)",
                params![id.as_str(), now.as_str()],
            )
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        Ok(id)
    }

    /// Update a sweep record with completion data.
    pub async fn update_sweep(&self, sweep_id: &str, stats_json: &str) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE sweeps SET finished_at = ?1, stats_json = ?2 WHERE id = ?3",
                params![now.as_str(), stats_json, sweep_id],
            )
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Stats JSON of the most recently started sweep, or `None` when no
    /// sweep has finished recording its stats yet.
    pub async fn latest_sweep_stats(&self) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT stats_json FROM sweeps ORDER BY started_at DESC, id DESC LIMIT 1",
                params![],
            )
            .await
            .map_err(|e| ProbcatError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<String>(0).ok()),
            Ok(None) => Ok(None),
            Err(e) => Err(ProbcatError::Storage(e.to_string())),
        }
    }
}

/// Convert a (name, rank, link) result row to a [`CatalogRow`].
fn row_to_catalog(row: &libsql::Row) -> Result<CatalogRow> {
    Ok(CatalogRow {
        name: row
            .get::<String>(0)
            .map_err(|e| ProbcatError::Storage(e.to_string()))?,
        rank: row.get::<i64>(1).ok(),
        link: row.get::<String>(2).ok(),
    })
}

async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<CatalogRow>> {
    let mut results = Vec::new();
    while let Ok(Some(row)) = rows.next().await {
        results.push(row_to_catalog(&row)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("probcat_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn record(name: &str, rank: Option<i64>, tags: &[&str]) -> ProblemRecord {
        ProblemRecord {
            name: Some(name.into()),
            rank,
            solve_count: Some(100),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            link: Some(format!("https://codeforces.com/problemset/{name}")),
        }
    }

    async fn count(storage: &Storage, sql: &str) -> i64 {
        let mut rows = storage.conn.query(sql, params![]).await.expect("count query");
        rows.next()
            .await
            .expect("count row")
            .expect("count row present")
            .get::<i64>(0)
            .expect("count value")
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        assert_eq!(storage.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("probcat_test_{}.db", Uuid::now_v7()));
        let s1 = Storage::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let storage = test_storage().await;
        let r = record("Two Sum - 4A", Some(1200), &["dp", "greedy"]);

        assert_eq!(
            storage.upsert_problem(&r).await.unwrap(),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            storage.upsert_problem(&r).await.unwrap(),
            UpsertOutcome::AlreadyKnown
        );

        assert_eq!(count(&storage, "SELECT COUNT(*) FROM problems").await, 1);
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM tags").await, 2);
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM problem_tags").await, 2);
    }

    #[tokio::test]
    async fn first_write_wins_on_natural_key() {
        let storage = test_storage().await;
        storage
            .upsert_problem(&record("Two Sum - 4A", Some(1200), &[]))
            .await
            .unwrap();
        storage
            .upsert_problem(&record("Two Sum - 4A", Some(2400), &[]))
            .await
            .unwrap();

        let rows = storage.search_by_name("Two Sum", None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, Some(1200));
    }

    #[tokio::test]
    async fn overlapping_tag_is_shared() {
        let storage = test_storage().await;
        storage
            .upsert_problem(&record("A - 1A", Some(800), &["dp"]))
            .await
            .unwrap();
        storage
            .upsert_problem(&record("B - 1B", Some(900), &["dp"]))
            .await
            .unwrap();

        assert_eq!(count(&storage, "SELECT COUNT(*) FROM tags").await, 1);
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM problem_tags").await, 2);
    }

    #[tokio::test]
    async fn nameless_record_is_skipped() {
        let storage = test_storage().await;
        let r = ProblemRecord {
            name: None,
            rank: Some(1200),
            tags: vec!["dp".into()],
            ..Default::default()
        };
        assert_eq!(
            storage.upsert_problem(&r).await.unwrap(),
            UpsertOutcome::Skipped
        );
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM problems").await, 0);
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM tags").await, 0);
    }

    #[tokio::test]
    async fn linkless_record_is_still_ingested() {
        let storage = test_storage().await;
        let r = ProblemRecord {
            name: Some("Ghost - 9Z".into()),
            ..Default::default()
        };
        assert_eq!(
            storage.upsert_problem(&r).await.unwrap(),
            UpsertOutcome::Inserted
        );
        let rows = storage.search_by_name("Ghost", None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].link, None);
        assert_eq!(rows[0].rank, None);
    }

    #[tokio::test]
    async fn reingestion_heals_missing_associations() {
        let storage = test_storage().await;

        // Simulate a crash mid-sweep: problem row landed, associations did not.
        storage
            .conn
            .execute(
                "INSERT INTO problems (name, rank, solve_count, link) VALUES (?1, ?2, ?3, ?4)",
                params!["Two Sum - 4A", 1200_i64, 5000_i64, "https://example.com/4A"],
            )
            .await
            .unwrap();
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM problem_tags").await, 0);

        let outcome = storage
            .upsert_problem(&record("Two Sum - 4A", Some(1200), &["dp", "greedy"]))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::AlreadyKnown);
        assert_eq!(count(&storage, "SELECT COUNT(*) FROM problem_tags").await, 2);
    }

    #[tokio::test]
    async fn tag_search_is_exact() {
        let storage = test_storage().await;
        storage
            .upsert_problem(&record("A - 1A", Some(800), &["dp"]))
            .await
            .unwrap();
        storage
            .upsert_problem(&record("B - 1B", Some(900), &["dp2"]))
            .await
            .unwrap();

        let rows = storage.search_by_tag("dp").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "A - 1A");
    }

    #[tokio::test]
    async fn name_search_dedups_multi_tag_matches() {
        let storage = test_storage().await;
        storage
            .upsert_problem(&record("Sum Game - 2C", Some(1500), &["dp", "dp2"]))
            .await
            .unwrap();

        // Tag substring "dp" matches both tags of the same problem.
        let rows = storage
            .search_by_name("Sum", None, Some("dp"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn rank_and_tag_conjunction() {
        let storage = test_storage().await;
        storage
            .upsert_problem(&record("A - 1A", Some(800), &["dp"]))
            .await
            .unwrap();
        storage
            .upsert_problem(&record("B - 1B", Some(900), &["dp"]))
            .await
            .unwrap();

        let rows = storage.search_by_rank_and_tag(800, "dp").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "A - 1A");

        assert!(storage
            .search_by_rank_and_tag(800, "graphs")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn distinct_listings_are_sorted() {
        let storage = test_storage().await;
        storage
            .upsert_problem(&record("A - 1A", Some(1500), &["greedy"]))
            .await
            .unwrap();
        storage
            .upsert_problem(&record("B - 1B", Some(800), &["dp"]))
            .await
            .unwrap();
        storage
            .upsert_problem(&record("C - 1C", None, &["math"]))
            .await
            .unwrap();

        assert_eq!(storage.distinct_ranks().await.unwrap(), vec![800, 1500]);
        assert_eq!(
            storage.distinct_tags().await.unwrap(),
            vec!["dp".to_string(), "greedy".to_string(), "math".to_string()]
        );
        assert_eq!(
            storage.distinct_ranks_for_tag("dp").await.unwrap(),
            vec![800]
        );
        assert_eq!(
            storage.distinct_tags_for_rank(1500).await.unwrap(),
            vec!["greedy".to_string()]
        );
    }

    #[tokio::test]
    async fn sweep_lifecycle() {
        let storage = test_storage().await;
        let sweep_id = storage.insert_sweep().await.expect("insert sweep");
        assert!(!sweep_id.is_empty());

        // Started but not yet finished: no stats recorded.
        assert_eq!(storage.latest_sweep_stats().await.unwrap(), None);

        storage
            .update_sweep(&sweep_id, r#"{"new_items": 10}"#)
            .await
            .expect("update sweep");

        let stats = storage
            .latest_sweep_stats()
            .await
            .unwrap()
            .expect("stats present");
        assert!(stats.contains("new_items"));
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("probcat_test_{}.db", Uuid::now_v7()));
        let rw = Storage::open(&tmp).await.unwrap();
        rw.upsert_problem(&record("A - 1A", Some(800), &[]))
            .await
            .unwrap();
        drop(rw);

        let ro = Storage::open_readonly(&tmp).await.unwrap();
        let result = ro.upsert_problem(&record("B - 1B", Some(900), &[])).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read-only"));

        // Reads still work.
        let rows = ro.search_by_name("A", None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
