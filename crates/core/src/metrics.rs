//! Prometheus metrics for the crawl pipeline.
//!
//! This module provides metrics for:
//! - Outbound fetches (catalog pages, searches, descriptors)
//! - Enumeration (pages walked, items discovered)
//! - Resolution outcomes and emitted magnet links

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Fetch Metrics
// =============================================================================

/// Outbound fetches by result.
pub static FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_fetches_total", "Total outbound HTTP fetches"),
        &["result"], // "success", "http_error", "transport_error"
    )
    .unwrap()
});

/// Fetches currently holding a gate permit.
pub static FETCHES_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trawler_fetches_in_flight",
        "Outbound fetches currently holding a permit",
    )
    .unwrap()
});

// =============================================================================
// Enumeration Metrics
// =============================================================================

/// Catalog pages walked by category.
pub static CATALOG_PAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_catalog_pages_total", "Catalog listing pages processed"),
        &["category"],
    )
    .unwrap()
});

/// Newly discovered items (first sighting of an identity).
pub static ITEMS_DISCOVERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trawler_items_discovered_total",
        "Items seen for the first time",
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Resolution attempts by outcome.
pub static RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_resolutions_total", "Torrent resolution attempts"),
        &["outcome"], // "resolved", "fetch_failed", "no_candidates", "decode_failed"
    )
    .unwrap()
});

/// Magnet lines written to the output sink.
pub static MAGNETS_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("trawler_magnets_written_total", "Magnet links written").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FETCHES.clone()),
        Box::new(FETCHES_IN_FLIGHT.clone()),
        Box::new(CATALOG_PAGES.clone()),
        Box::new(ITEMS_DISCOVERED.clone()),
        Box::new(RESOLUTIONS.clone()),
        Box::new(MAGNETS_WRITTEN.clone()),
    ]
}
