//! Run a single aggregation pass and print the resulting JSON to stdout.
//!
//! Logs go to stderr; tune with `RUST_LOG` (e.g. `RUST_LOG=crypto_news_feed=debug`).

use crypto_news_feed::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = AppConfig::from_env();
    let aggregator = crypto_news_feed::build_aggregator(&cfg)?;
    let items = aggregator.run().await;

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
