//! Per-row field extraction from a listing page's problem table.
//!
//! Each field of a row is extracted independently and fail-soft: a missing
//! or malformed sub-element yields `None` (tags: empty) plus a logged
//! diagnostic, never a discarded row. The composite `name` is only present
//! when both the title and the numeral identifier extracted; ingestion
//! skips nameless records rather than risk key collisions.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use probcat_shared::{ProblemRecord, compose_name};

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));

/// Header/separator rows carry `th` cells instead of `td`.
static HEADER_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("header cell selector"));

static NUMERAL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.id").expect("numeral selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[style="float: left;"]"#).expect("title selector"));

static RANK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.ProblemRating").expect("rank selector"));

static SOLVED_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[title="Participants solved the problem"]"#).expect("solved selector")
});

static TAG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.notice").expect("tag selector"));

static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("link selector"));

/// Digits of the solved marker after one leading non-digit (e.g. `x5000`).
static SOLVED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D?(\d+)$").expect("solved regex"));

/// Extract zero-or-more candidate records from one listing page.
///
/// Header rows produce no record; every data row produces exactly one,
/// however degraded its fields.
pub fn extract_records(html: &str, base: &Url) -> Vec<ProblemRecord> {
    let doc = Html::parse_document(html);
    let mut records = Vec::new();

    for row in doc.select(&ROW_SEL) {
        if row.select(&HEADER_CELL_SEL).next().is_some() {
            continue;
        }
        records.push(extract_row(row, base));
    }

    records
}

fn extract_row(row: ElementRef<'_>, base: &Url) -> ProblemRecord {
    let numeral = extract_numeral(row);
    let title = extract_title(row);

    ProblemRecord {
        name: compose_name(title.as_deref(), numeral.as_deref()),
        rank: extract_rank(row),
        solve_count: extract_solve_count(row),
        tags: extract_tags(row),
        link: extract_link(row, base),
    }
}

fn collect_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn extract_numeral(row: ElementRef<'_>) -> Option<String> {
    let Some(cell) = row.select(&NUMERAL_SEL).next() else {
        warn!("row has no numeral cell");
        return None;
    };
    let text = collect_text(cell);
    if text.is_empty() {
        warn!("numeral cell is empty");
        return None;
    }
    Some(text)
}

fn extract_title(row: ElementRef<'_>) -> Option<String> {
    let Some(cell) = row.select(&TITLE_SEL).next() else {
        warn!("row has no title element");
        return None;
    };
    let text = collect_text(cell);
    if text.is_empty() {
        warn!("title element is empty");
        return None;
    }
    Some(text)
}

/// Difficulty rating. Absence is normal (unrated problems); only a
/// non-numeric or negative marker is diagnosed.
fn extract_rank(row: ElementRef<'_>) -> Option<i64> {
    let el = row.select(&RANK_SEL).next()?;
    let text = collect_text(el);
    match text.parse::<i64>() {
        Ok(rank) if rank >= 0 => Some(rank),
        Ok(rank) => {
            warn!(rank, "negative difficulty marker");
            None
        }
        Err(e) => {
            warn!(text, error = %e, "unparseable difficulty marker");
            None
        }
    }
}

/// Solved count from a marker like `x5000` (one leading non-digit stripped).
fn extract_solve_count(row: ElementRef<'_>) -> Option<i64> {
    let el = row.select(&SOLVED_SEL).next()?;
    let text = collect_text(el);
    let Some(caps) = SOLVED_RE.captures(&text) else {
        warn!(text, "unparseable solved marker");
        return None;
    };
    match caps[1].parse::<i64>() {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(text, error = %e, "solved marker out of range");
            None
        }
    }
}

fn extract_tags(row: ElementRef<'_>) -> Vec<String> {
    row.select(&TAG_SEL)
        .map(collect_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Link of the main title anchor: the row's first anchor, joined with the
/// base origin. A row without one is still emitted, just link-less.
fn extract_link(row: ElementRef<'_>, base: &Url) -> Option<String> {
    let Some(href) = row
        .select(&LINK_SEL)
        .next()
        .and_then(|el| el.value().attr("href"))
    else {
        warn!("row has no link anchor");
        return None;
    };
    match base.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!(href, error = %e, "row link did not resolve against base");
            None
        }
    }
}
