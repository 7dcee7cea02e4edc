//! Sweep orchestration: one full pagination traversal with ingestion, plus
//! the periodic scheduler loop.
//!
//! A sweep restarts from the first listing page every time — there is no
//! checkpointing — and is safe to repeat because ingestion is idempotent.
//! A page fetch failure aborts the whole sweep; the scheduler retries on
//! the next cycle rather than resuming mid-catalog.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use probcat_crawler::{PageFetcher, Paginator, extract_records};
use probcat_shared::{AppConfig, ProbcatError, Result};
use probcat_storage::{Storage, UpsertOutcome};

/// Summary of one completed sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Listing pages processed.
    pub pages: usize,
    /// Candidate records extracted across all pages.
    pub records: usize,
    /// Records skipped for lacking a composable name.
    pub skipped: usize,
    /// Newly inserted problems (observability only).
    pub new_items: usize,
    /// Total sweep duration.
    pub duration: Duration,
}

/// How a sweep's page walk ended when it did not fail outright.
enum SweepEnd {
    /// End of catalog reached.
    Completed,
    /// Stop requested before the catalog was exhausted.
    Cancelled,
}

/// Runs crawl-and-ingest sweeps against one configured listing.
pub struct Sweeper {
    fetcher: PageFetcher,
    base: Url,
    start: Url,
}

impl Sweeper {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let base = Url::parse(&config.listing.base_url)
            .map_err(|e| ProbcatError::config(format!("invalid base_url: {e}")))?;
        let start = base
            .join(&config.listing.start_path)
            .map_err(|e| ProbcatError::config(format!("invalid start_path: {e}")))?;
        let fetcher = PageFetcher::new(Duration::from_secs(config.sweep.fetch_timeout_secs))?;

        Ok(Self {
            fetcher,
            base,
            start,
        })
    }

    /// One full crawl-and-ingest pass. Idempotent and safe to call
    /// repeatedly; returns the new-insert count for observability.
    ///
    /// The stop token is checked between pages, so cancellation latency is
    /// bounded by a single page fetch.
    #[instrument(skip_all, fields(start = %self.start))]
    pub async fn run_sweep(
        &self,
        storage: &Storage,
        cancel: &CancellationToken,
    ) -> Result<SweepReport> {
        let started = Instant::now();
        let sweep_id = storage.insert_sweep().await?;
        info!("starting sweep");

        let mut report = SweepReport::default();
        let outcome = self.sweep_pages(storage, cancel, &mut report).await;
        report.duration = started.elapsed();

        let status = match &outcome {
            Ok(SweepEnd::Completed) => "completed",
            Ok(SweepEnd::Cancelled) => "cancelled",
            Err(_) => "aborted",
        };
        let stats = serde_json::json!({
            "status": status,
            "pages": report.pages,
            "records": report.records,
            "skipped": report.skipped,
            "new_items": report.new_items,
        });
        if let Err(e) = storage.update_sweep(&sweep_id, &stats.to_string()).await {
            warn!(error = %e, "failed to record sweep stats");
        }

        outcome?;

        info!(
            pages = report.pages,
            records = report.records,
            skipped = report.skipped,
            new_items = report.new_items,
            duration_ms = report.duration.as_millis(),
            "sweep completed"
        );
        Ok(report)
    }

    async fn sweep_pages(
        &self,
        storage: &Storage,
        cancel: &CancellationToken,
        report: &mut SweepReport,
    ) -> Result<SweepEnd> {
        let mut paginator = Paginator::new(&self.fetcher, self.base.clone(), self.start.clone());

        loop {
            if cancel.is_cancelled() {
                info!("stop requested, ending sweep early");
                return Ok(SweepEnd::Cancelled);
            }

            let Some(page) = paginator.next_page().await? else {
                debug!("no next-page link, end of catalog");
                return Ok(SweepEnd::Completed);
            };
            report.pages += 1;

            let records = extract_records(&page.html, &self.base);
            debug!(url = %page.url, records = records.len(), "ingesting page");

            // Rows are ingested strictly in page order.
            for record in &records {
                report.records += 1;
                match storage.upsert_problem(record).await? {
                    UpsertOutcome::Inserted => report.new_items += 1,
                    UpsertOutcome::AlreadyKnown => {}
                    UpsertOutcome::Skipped => report.skipped += 1,
                }
            }
        }
    }
}

/// Periodically re-run sweeps until the token is cancelled.
///
/// A failed sweep is logged and retried on the next cycle; it never
/// terminates the loop. The idle wait races against cancellation, so the
/// loop exits promptly even mid-interval.
pub async fn run_scheduler(
    sweeper: &Sweeper,
    storage: &Storage,
    interval: Duration,
    cancel: &CancellationToken,
) {
    loop {
        match sweeper.run_sweep(storage, cancel).await {
            Ok(report) => {
                info!(new_items = report.new_items, "scheduled sweep finished");
            }
            Err(e) => {
                warn!(error = %e, "sweep failed, will retry next cycle");
            }
        }

        if cancel.is_cancelled() {
            info!("scheduler stopped");
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("scheduler stopped during idle wait");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
