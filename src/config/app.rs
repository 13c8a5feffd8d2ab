// src/config/app.rs
use std::env;
use std::time::Duration;

pub const ENV_FETCH_TIMEOUT_SECS: &str = "NEWS_FETCH_TIMEOUT_SECS";
pub const ENV_CACHE_TTL_MS: &str = "NEWS_CACHE_TTL_MS";
pub const ENV_USER_AGENT: &str = "NEWS_USER_AGENT";

fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_cache_ttl_ms() -> u64 {
    60_000
}
fn default_user_agent() -> String {
    concat!("crypto-news-feed/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Process settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Upper bound for a single source fetch.
    pub fetch_timeout: Duration,
    /// How long one aggregation result is served before recomputing.
    pub cache_ttl: Duration,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(default_fetch_timeout_secs()),
            cache_ttl: Duration::from_millis(default_cache_ttl_ms()),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Read settings from the environment; invalid or zero values fall back to defaults.
    pub fn from_env() -> Self {
        let fetch_secs = parse_positive(env::var(ENV_FETCH_TIMEOUT_SECS).ok())
            .unwrap_or_else(default_fetch_timeout_secs);
        let ttl_ms =
            parse_positive(env::var(ENV_CACHE_TTL_MS).ok()).unwrap_or_else(default_cache_ttl_ms);
        let user_agent = env::var(ENV_USER_AGENT)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_user_agent);

        Self {
            fetch_timeout: Duration::from_secs(fetch_secs),
            cache_ttl: Duration::from_millis(ttl_ms),
            user_agent,
        }
    }
}

fn parse_positive(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}
