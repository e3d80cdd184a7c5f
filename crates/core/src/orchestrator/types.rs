//! Types for the harvest pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A catalog page could not be attributed to its seed.
    #[error("enumeration aborted: {0}")]
    Enumeration(#[from] crate::enumerator::EnumerateError),

    /// The final cache persist failed.
    #[error("cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    /// Magnet lines could not be written.
    #[error("output error: {0}")]
    Output(#[from] crate::output::OutputError),

    /// A pipeline task panicked.
    #[error("worker failed: {0}")]
    Worker(String),
}

/// Counters of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seeds: usize,
    /// Items seen for the first time.
    pub discovered: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub magnets_written: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
}
