// src/lib.rs
// Public library surface for integration tests and the binaries.

pub mod api;
pub mod cache;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod sanitize;
pub mod sentiment;
pub mod truncate;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::ingest::types::{FeedFetcher, FeedSource, NewsItem, RawEntry};
pub use crate::ingest::Aggregator;
pub use crate::sentiment::{Sentiment, SentimentClassifier};

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ingest::providers::HttpFeedFetcher;

/// Wire the production aggregator: configured sources, HTTP fetcher, default classifier.
pub fn build_aggregator(cfg: &AppConfig) -> anyhow::Result<Aggregator> {
    let sources = ingest::config::load_sources_default()?;
    let fetcher = HttpFeedFetcher::new(&cfg.user_agent, cfg.fetch_timeout)?;
    tracing::info!(
        sources = sources.len(),
        timeout_secs = cfg.fetch_timeout.as_secs(),
        "aggregator configured"
    );
    Ok(Aggregator::new(
        sources,
        Arc::new(fetcher),
        Arc::new(SentimentClassifier::default()),
    )
    .with_fetch_timeout(cfg.fetch_timeout))
}
