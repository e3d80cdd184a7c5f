//! Harvest pipeline.
//!
//! Three stages connected by unbounded queues:
//! - **Enumeration**: a bounded pool walks seeds and queues new items
//! - **Resolution**: a bounded pool resolves queued items
//! - **Output**: a single consumer records results in the cache and writes magnet lines
//!
//! Each stage closes its output queue only after all of its workers joined.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::Harvester;
pub use types::{OrchestratorError, RunSummary};
