// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// A named feed with its fetch location and category tag. Fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String, // e.g., "CoinDesk"
    pub url: String,
    pub tag: String, // e.g., "Crypto News"
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            tag: tag.into(),
        }
    }
}

/// One syndicated item as the fetcher saw it. Every field is untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Raw `pubDate` / `published` / `dc:date` text.
    pub published: Option<String>,
    /// Raw `updated` text.
    pub updated: Option<String>,
    /// Structured content bodies (`content:encoded`, Atom `content`), in document order.
    pub content: Vec<String>,
    /// `description` / Atom `summary`.
    pub summary: Option<String>,
}

/// Where an entry's description comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryBody<'a> {
    Content(&'a str),
    Summary(&'a str),
    /// Neither body is present; the title stands in.
    Missing,
}

impl RawEntry {
    /// Description precedence: first structured content body, then summary, then nothing.
    pub fn body(&self) -> EntryBody<'_> {
        if let Some(first) = self.content.first() {
            return EntryBody::Content(first);
        }
        match &self.summary {
            Some(s) => EntryBody::Summary(s),
            None => EntryBody::Missing,
        }
    }
}

/// Output record of one aggregation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub tag: String,
    pub title: String,
    pub description: String,
    pub sentiment: Sentiment,
    /// Publication date in UTC, no time of day (`YYYY-MM-DD` on the wire).
    pub date: NaiveDate,
    pub source: String,
    pub link: String,
}

/// Feed-fetch collaborator: raw entries for one source.
///
/// Any error means "skip this source for this pass".
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>>;
    fn name(&self) -> &'static str;
}
