//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Worker pool sizes of the pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Seeds walked at the same time.
    #[serde(default = "default_enumeration_workers")]
    pub enumeration_workers: usize,

    /// Items resolved at the same time.
    /// Network concurrency is capped separately by `http.max_concurrent_requests`.
    #[serde(default = "default_resolution_workers")]
    pub resolution_workers: usize,
}

fn default_enumeration_workers() -> usize {
    8
}

fn default_resolution_workers() -> usize {
    16
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enumeration_workers: default_enumeration_workers(),
            resolution_workers: default_resolution_workers(),
        }
    }
}
