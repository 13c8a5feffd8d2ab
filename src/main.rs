//! News feed service: binary entrypoint.
//! Boots the Axum HTTP server with the aggregator, response cache and metrics.

use crypto_news_feed::api::{self, AppState};
use crypto_news_feed::config::AppConfig;
use crypto_news_feed::metrics::Metrics;
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::from_env();
    let aggregator = crypto_news_feed::build_aggregator(&cfg)?;
    let state = AppState::new(aggregator, cfg.cache_ttl);

    let router = match Metrics::install(cfg.cache_ttl) {
        Ok(metrics) => api::router_with_metrics(state, &metrics),
        Err(e) => {
            tracing::warn!(error = %e, "metrics recorder unavailable; serving without /metrics");
            api::router(state)
        }
    };

    Ok(router.into())
}
