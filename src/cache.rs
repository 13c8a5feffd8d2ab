//! In-memory memo for the last aggregation result (absolute TTL, no sliding refresh).

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use tokio::sync::Mutex;

use crate::ingest::types::NewsItem;

/// Reported to clients through the `X-News-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug)]
struct Cached {
    at: Instant,
    items: Arc<Vec<NewsItem>>,
}

#[derive(Debug)]
pub struct NewsCache {
    ttl: Duration,
    // Held across the refresh so concurrent readers wait for one pass instead of starting their own.
    slot: Mutex<Option<Cached>>,
}

impl NewsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Serve the memoized result while it is younger than the TTL, otherwise run
    /// `refresh` and remember its output.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> (Arc<Vec<NewsItem>>, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<NewsItem>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(c) = slot.as_ref() {
            if c.at.elapsed() < self.ttl {
                counter!("news_cache_hits_total").increment(1);
                return (Arc::clone(&c.items), CacheStatus::Hit);
            }
        }

        let items = Arc::new(refresh().await);
        *slot = Some(Cached {
            at: Instant::now(),
            items: Arc::clone(&items),
        });
        counter!("news_cache_misses_total").increment(1);
        (items, CacheStatus::Miss)
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
