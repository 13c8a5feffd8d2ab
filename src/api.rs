use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::cache::NewsCache;
use crate::ingest::Aggregator;
use crate::metrics::Metrics;

pub const CACHE_HEADER: &str = "x-news-cache";

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub cache: Arc<NewsCache>,
}

impl AppState {
    pub fn new(aggregator: Aggregator, cache_ttl: Duration) -> Self {
        Self {
            aggregator,
            cache: Arc::new(NewsCache::new(cache_ttl)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// [`router`] plus the Prometheus `/metrics` endpoint.
pub fn router_with_metrics(state: AppState, metrics: &Metrics) -> Router {
    router(state).merge(metrics.router())
}

async fn news(State(state): State<AppState>) -> impl IntoResponse {
    let aggregator = state.aggregator.clone();
    let (items, status) = state
        .cache
        .get_or_refresh(|| async move { aggregator.run().await })
        .await;
    (
        [(CACHE_HEADER, status.as_header())],
        Json(Vec::clone(&items)),
    )
}
