// src/ingest/error.rs
//! Per-unit failure taxonomy. None of these ever escape an aggregation pass.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// A whole source contributed nothing this pass.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed for {feed}: {error:#}")]
    Failed {
        feed: String,
        error: anyhow::Error,
    },

    #[error("fetch for {feed} timed out after {timeout:?}")]
    TimedOut { feed: String, timeout: Duration },
}

/// Why a single entry did not become a news item.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntrySkip {
    #[error("no publication timestamp")]
    MissingTimestamp,

    #[error("unparseable timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("published {published} is outside the 24h window")]
    Stale { published: DateTime<Utc> },

    #[error("empty title")]
    EmptyTitle,

    #[error("empty link")]
    EmptyLink,

    #[error("duplicate link {0}")]
    DuplicateLink(String),

    #[error("duplicate title {0:?}")]
    DuplicateTitle(String),
}

impl EntrySkip {
    /// Malformed input (processing failure) as opposed to an ordinary policy rejection.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            EntrySkip::MissingTimestamp
                | EntrySkip::InvalidTimestamp(_)
                | EntrySkip::EmptyTitle
                | EntrySkip::EmptyLink
        )
    }
}
