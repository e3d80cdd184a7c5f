//! Identity cache that deduplicates catalog items across seeds and runs.
//!
//! [`DedupCache`] is the only state shared by the concurrent enumeration
//! workers. It is backed by a [`CacheStore`] which receives a full snapshot
//! after every insertion and once more at the end of a run.

mod dedup;
mod store;

pub use dedup::DedupCache;
pub use store::{CacheSnapshot, JsonFileStore, MemoryStore};

use thiserror::Error;

/// Errors raised by cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache snapshot in {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cache store task failed: {0}")]
    Task(String),
}

/// Storage backend for cache snapshots.
pub trait CacheStore: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Read the stored snapshot. A missing or empty store yields an empty snapshot.
    fn load(&self) -> Result<CacheSnapshot, CacheError>;

    /// Replace the stored snapshot with `snapshot`.
    ///
    /// May block; [`DedupCache`] calls it on the blocking thread pool.
    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError>;
}
