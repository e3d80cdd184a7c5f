mod metrics;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trawler_core::{
    load_config, validate_config, CacheStore, DedupCache, FileSink, Harvester, HttpFetcher,
    JsonFileStore, LogSink, MagnetSink, MemoryStore,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("TRAWLER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("trawler.toml"));

    info!("trawler {} loading configuration from {:?}", VERSION, config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    // Cache: JSON file when configured, otherwise in memory only
    let store: Arc<dyn CacheStore> = match &config.cache.path {
        Some(path) => Arc::new(JsonFileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };
    let cache = Arc::new(
        DedupCache::load(store).context("Failed to load cache")?,
    );

    let fetcher = Arc::new(
        HttpFetcher::new(&config.http).context("Failed to create HTTP client")?,
    );
    info!(
        max_concurrent_requests = fetcher.gate().capacity(),
        "HTTP fetcher initialized"
    );

    // Magnet output: append to a file when configured, otherwise log
    let sink: Arc<dyn MagnetSink> = match &config.output.magnet_path {
        Some(path) => Arc::new(
            FileSink::open(path)
                .await
                .with_context(|| format!("Failed to open magnet output {:?}", path))?,
        ),
        None => Arc::new(LogSink),
    };

    let seeds = config.seeds.seeds();
    let harvester = Harvester::from_config(&config, fetcher, cache);
    let result = harvester.run(seeds, sink).await;

    if let Ok(summary) = &result {
        metrics::record_summary(summary);
        info!(
            summary = %serde_json::to_string(summary).unwrap_or_default(),
            "Run summary"
        );
    }
    if let Some(path) = &config.metrics.path {
        metrics::write_metrics(path)?;
        info!("Metrics written to {:?}", path);
    }

    result.context("Harvest failed")?;
    Ok(())
}
