//! Sequential page fetching and pagination.
//!
//! [`PageFetcher`] retrieves one listing page's raw HTML; [`Paginator`]
//! drives it across sequential pages, deducing each "next page" link from
//! the pagination control of the current page. Pages are fetched strictly
//! one at a time — the upstream listing is crawled politely and rows keep
//! their discovery order.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use probcat_shared::{ProbcatError, Result};

/// User-Agent string for listing requests.
const USER_AGENT: &str = concat!("probcat/", env!("CARGO_PKG_VERSION"));

/// Page-number entries inside the pagination control.
static PAGE_INDEX_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pagination span.page-index").expect("page-index selector"));

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("anchor selector"));

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// HTTP client wrapper for fetching listing pages.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Create a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| ProbcatError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch one page's raw HTML. A network failure, timeout, or non-2xx
    /// status is a [`ProbcatError::Fetch`], which aborts the current sweep.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching listing page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ProbcatError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbcatError::Fetch(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ProbcatError::Fetch(format!("{url}: body read failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Paginator
// ---------------------------------------------------------------------------

/// One fetched listing page.
pub struct ListingPage {
    /// The URL this page was fetched from.
    pub url: Url,
    /// Raw HTML content.
    pub html: String,
}

/// Walks the listing page by page until no next-page link remains.
///
/// There is no checkpointing: every sweep starts a fresh `Paginator` from
/// the first page, which is safe because ingestion is idempotent.
pub struct Paginator<'a> {
    fetcher: &'a PageFetcher,
    base: Url,
    next: Option<Url>,
}

impl<'a> Paginator<'a> {
    pub fn new(fetcher: &'a PageFetcher, base: Url, start: Url) -> Self {
        Self {
            fetcher,
            base,
            next: Some(start),
        }
    }

    /// Fetch the next page, or `Ok(None)` once the catalog is exhausted.
    ///
    /// `Ok(None)` is the normal end-of-catalog condition; a fetch failure
    /// surfaces as `Err` and ends the sweep without partial resume.
    pub async fn next_page(&mut self) -> Result<Option<ListingPage>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let html = self.fetcher.fetch(&url).await?;

        // `Html` is not Send; parse and drop it before yielding to the caller.
        self.next = {
            let doc = Html::parse_document(&html);
            find_next_page(&doc, &self.base)
        };

        Ok(Some(ListingPage { url, html }))
    }
}

/// Locate the active page indicator in the pagination control and deduce
/// the link of the immediately following page. `None` means this is the
/// last page.
pub fn find_next_page(doc: &Html, base: &Url) -> Option<Url> {
    let entries: Vec<_> = doc.select(&PAGE_INDEX_SEL).collect();
    let active = entries
        .iter()
        .position(|el| el.value().classes().any(|c| c == "active"))?;
    let next = entries.get(active + 1)?;
    let href = next.select(&ANCHOR_SEL).next()?.value().attr("href")?;

    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(href, error = %e, "next-page link did not resolve against base");
            None
        }
    }
}
