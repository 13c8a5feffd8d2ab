// src/ingest/mod.rs
//! Aggregation engine: fetch every configured source, then clean, window, dedup,
//! label and order the entries into one news list.
//!
//! Fetches run concurrently, but everything after the fetch is a single sequential
//! loop over sources in configuration order, so the cross-source dedup sets are
//! never shared.

pub mod config;
pub mod error;
pub mod providers;
pub mod timestamp;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::ingest::error::{EntrySkip, FetchError};
use crate::ingest::timestamp::parse_feed_timestamp;
use crate::ingest::types::{EntryBody, FeedFetcher, FeedSource, NewsItem, RawEntry};
use crate::sanitize::clean_text;
use crate::sentiment::SentimentClassifier;
use crate::truncate::truncate_default;

/// Rolling freshness window, measured back from the start of a pass.
pub const WINDOW_HOURS: i64 = 24;

/// Per-source fetch bound used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Raw entries returned by fetchers.");
        describe_counter!("ingest_kept_total", "Entries turned into news items.");
        describe_counter!(
            "ingest_skipped_total",
            "Entries dropped (malformed, stale or duplicate)."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Sources whose fetch failed or timed out."
        );
        describe_histogram!("ingest_pass_ms", "Aggregation pass time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the aggregation pass last ran."
        );
    });
}

/// Links and titles already accepted during the current pass.
#[derive(Debug, Default)]
pub struct DedupState {
    links: HashSet<String>,
    titles: HashSet<String>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a repeat of either key; otherwise remember both.
    pub fn admit(&mut self, link: &str, title: &str) -> Result<(), EntrySkip> {
        if self.links.contains(link) {
            return Err(EntrySkip::DuplicateLink(link.to_string()));
        }
        if self.titles.contains(title) {
            return Err(EntrySkip::DuplicateTitle(title.to_string()));
        }
        self.links.insert(link.to_string());
        self.titles.insert(title.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// "published" first, then "updated". Blank values count as absent.
pub fn resolve_timestamp(entry: &RawEntry) -> Result<DateTime<Utc>, EntrySkip> {
    let mut unparseable = None;
    for raw in [entry.published.as_deref(), entry.updated.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
    {
        match parse_feed_timestamp(raw) {
            Some(ts) => return Ok(ts),
            None => {
                unparseable.get_or_insert_with(|| raw.trim().to_string());
            }
        }
    }
    Err(match unparseable {
        Some(raw) => EntrySkip::InvalidTimestamp(raw),
        None => EntrySkip::MissingTimestamp,
    })
}

/// Cleaned, bounded description. Falls back to the (already clean) title when the
/// entry has no body or the body cleans down to nothing.
pub fn describe(entry: &RawEntry, title: &str) -> String {
    let raw = match entry.body() {
        EntryBody::Content(s) | EntryBody::Summary(s) => s,
        EntryBody::Missing => "",
    };
    if raw.is_empty() {
        return title.to_string();
    }
    let cleaned = truncate_default(&clean_text(raw));
    if cleaned.trim().is_empty() {
        title.to_string()
    } else {
        cleaned
    }
}

/// Turn one raw entry into a news item, or say why not.
///
/// Entries at exactly `cutoff` are kept; only strictly older ones are stale.
pub fn process_entry(
    source: &FeedSource,
    entry: &RawEntry,
    cutoff: DateTime<Utc>,
    dedup: &mut DedupState,
    classifier: &SentimentClassifier,
) -> Result<NewsItem, EntrySkip> {
    let published = resolve_timestamp(entry)?;
    if published < cutoff {
        return Err(EntrySkip::Stale { published });
    }

    let title = clean_text(entry.title.as_deref().unwrap_or_default());
    if title.is_empty() {
        return Err(EntrySkip::EmptyTitle);
    }
    let link = entry.link.as_deref().unwrap_or_default().trim().to_string();
    if link.is_empty() {
        return Err(EntrySkip::EmptyLink);
    }

    dedup.admit(&link, &title)?;

    let description = describe(entry, &title);
    let sentiment = classifier.label_description(&description);

    Ok(NewsItem {
        tag: source.tag.clone(),
        title,
        description,
        sentiment,
        date: published.date_naive(),
        source: source.name.clone(),
        link,
    })
}

/// Run every entry of one source through [`process_entry`], logging the rejects.
pub fn collect_source(
    source: &FeedSource,
    entries: &[RawEntry],
    cutoff: DateTime<Utc>,
    dedup: &mut DedupState,
    classifier: &SentimentClassifier,
) -> Vec<NewsItem> {
    tracing::info!(source = %source.name, entries = entries.len(), "parsed feed entries");
    counter!("ingest_events_total").increment(entries.len() as u64);

    let mut kept = Vec::new();
    for entry in entries {
        match process_entry(source, entry, cutoff, dedup, classifier) {
            Ok(item) => kept.push(item),
            Err(skip) => {
                if skip.is_malformed() {
                    tracing::warn!(source = %source.name, reason = %skip, "skipping entry");
                } else {
                    tracing::debug!(source = %source.name, reason = %skip, "entry rejected");
                }
                counter!("ingest_skipped_total").increment(1);
            }
        }
    }
    counter!("ingest_kept_total").increment(kept.len() as u64);
    kept
}

/// Newest date first. Stable, so equal dates keep source/entry order.
pub fn sort_newest_first(items: &mut [NewsItem]) {
    items.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Everything one aggregation pass needs. Cheap to clone.
#[derive(Clone)]
pub struct Aggregator {
    sources: Arc<[FeedSource]>,
    fetcher: Arc<dyn FeedFetcher>,
    classifier: Arc<SentimentClassifier>,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        sources: Vec<FeedSource>,
        fetcher: Arc<dyn FeedFetcher>,
        classifier: Arc<SentimentClassifier>,
    ) -> Self {
        Self {
            sources: sources.into(),
            fetcher,
            classifier,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Name of the configured fetcher, used as a log field and metric label.
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// One full pass anchored at the current time.
    pub async fn run(&self) -> Vec<NewsItem> {
        self.run_at(Utc::now()).await
    }

    /// One full pass anchored at `now`. Never fails: unreachable sources and bad
    /// entries only shrink the result.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Vec<NewsItem> {
        ensure_metrics_described();
        let t0 = Instant::now();
        let cutoff = now - chrono::Duration::hours(WINDOW_HOURS);

        let fetched = join_all(self.sources.iter().map(|s| self.fetch_one(s))).await;

        let mut dedup = DedupState::new();
        let mut items = Vec::new();
        for (source, result) in self.sources.iter().zip(fetched) {
            match result {
                Ok(entries) => {
                    let kept =
                        collect_source(source, &entries, cutoff, &mut dedup, &self.classifier);
                    items.extend(kept);
                }
                Err(e) => {
                    tracing::error!(
                        source = %source.name,
                        fetcher = self.fetcher.name(),
                        error = %e,
                        "failed to fetch feed"
                    );
                    counter!("ingest_provider_errors_total", "fetcher" => self.fetcher.name())
                        .increment(1);
                }
            }
        }

        sort_newest_first(&mut items);

        histogram!("ingest_pass_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("ingest_pipeline_last_run_ts").set(now.timestamp().max(0) as f64);
        tracing::info!(
            sources = self.sources.len(),
            items = items.len(),
            "aggregation pass finished"
        );

        items
    }

    async fn fetch_one(&self, source: &FeedSource) -> Result<Vec<RawEntry>, FetchError> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(source)).await {
            Ok(Ok(entries)) => Ok(entries),
            Ok(Err(error)) => Err(FetchError::Failed {
                feed: source.name.clone(),
                error,
            }),
            Err(_) => Err(FetchError::TimedOut {
                feed: source.name.clone(),
                timeout: self.fetch_timeout,
            }),
        }
    }
}
