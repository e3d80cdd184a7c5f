//! Prometheus registry for the trawler binary.
//!
//! Registers the core pipeline metrics plus gauges describing the last run,
//! and renders them in the text exposition format.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{self, Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::path::Path;

use trawler_core::RunSummary;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Item counts of the last run by outcome.
pub static LAST_RUN_ITEMS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("trawler_last_run_items", "Items handled by the last run"),
        &["outcome"], // "discovered", "resolved", "unresolved"
    )
    .unwrap()
});

/// Wall time of the last run in milliseconds.
pub static LAST_RUN_ELAPSED_MS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trawler_last_run_elapsed_milliseconds",
        "Duration of the last run",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(LAST_RUN_ITEMS.clone()))
        .unwrap();
    registry
        .register(Box::new(LAST_RUN_ELAPSED_MS.clone()))
        .unwrap();

    // Core metrics (fetches, enumeration, resolution, output)
    for metric in trawler_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

pub fn record_summary(summary: &RunSummary) {
    LAST_RUN_ITEMS
        .with_label_values(&["discovered"])
        .set(summary.discovered as i64);
    LAST_RUN_ITEMS
        .with_label_values(&["resolved"])
        .set(summary.resolved as i64);
    LAST_RUN_ITEMS
        .with_label_values(&["unresolved"])
        .set(summary.unresolved as i64);
    LAST_RUN_ELAPSED_MS.set(summary.elapsed_ms as i64);
}

pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics exposition is not UTF-8")
}

/// Overwrite `path` with the current exposition.
pub fn write_metrics(path: &Path) -> Result<()> {
    let text = encode_metrics()?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics to {:?}", path))
}
