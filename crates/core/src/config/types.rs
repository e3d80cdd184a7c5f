use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::enumerator::{Category, Seed};
use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub seeds: SeedsConfig,
}

/// Catalog site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Site root (e.g., "http://www.javlibrary.com")
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    /// Language path segment of the listing pages
    #[serde(default = "default_language")]
    pub language: String,
    /// Header suffix following the subject on actress listings
    #[serde(default = "default_actress_suffix")]
    pub actress_suffix: String,
    /// Header suffix following the subject on label listings
    #[serde(default = "default_label_suffix")]
    pub label_suffix: String,
    /// Header suffix following the subject on maker listings
    #[serde(default = "default_maker_suffix")]
    pub maker_suffix: String,
}

impl CatalogConfig {
    /// Header suffix phrase for `category`.
    pub fn suffix_for(&self, category: Category) -> &str {
        match category {
            Category::Actress => &self.actress_suffix,
            Category::Label => &self.label_suffix,
            Category::Maker => &self.maker_suffix,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            language: default_language(),
            actress_suffix: default_actress_suffix(),
            label_suffix: default_label_suffix(),
            maker_suffix: default_maker_suffix(),
        }
    }
}

fn default_catalog_url() -> String {
    "http://www.javlibrary.com".to_string()
}

fn default_language() -> String {
    "cn".to_string()
}

fn default_actress_suffix() -> String {
    "所演出的影片".to_string()
}

fn default_label_suffix() -> String {
    "发行的影片".to_string()
}

fn default_maker_suffix() -> String {
    "制作的影片".to_string()
}

/// Torrent index site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Index site root (e.g., "https://sukebei.nyaa.se")
    #[serde(default = "default_index_url")]
    pub base_url: String,
    /// Category filter passed with every search
    #[serde(default = "default_index_category")]
    pub category: String,
    /// Sort order passed with every search
    #[serde(default = "default_index_sort")]
    pub sort: String,
    /// How much size a trusted candidate may give up against the largest one
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance_bytes: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: default_index_url(),
            category: default_index_category(),
            sort: default_index_sort(),
            size_tolerance_bytes: default_size_tolerance(),
        }
    }
}

fn default_index_url() -> String {
    "https://sukebei.nyaa.se".to_string()
}

fn default_index_category() -> String {
    "8_30".to_string()
}

fn default_index_sort() -> String {
    "5".to_string()
}

fn default_size_tolerance() -> u64 {
    100 * 1024 * 1024
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Maximum simultaneous outbound requests (default: 20)
    #[serde(default = "default_max_requests")]
    pub max_concurrent_requests: usize,
    /// Request timeout in seconds (default: none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_requests(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_requests() -> usize {
    20
}

fn default_user_agent() -> String {
    concat!("trawler/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Cache persistence configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    /// JSON file holding known items; in-memory only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Magnet output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// File that magnet lines are appended to; log only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_path: Option<PathBuf>,
}

/// Metrics snapshot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// File receiving the Prometheus text exposition at the end of a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Seed identifiers per category
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedsConfig {
    #[serde(default)]
    pub actresses: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub makers: Vec<String>,
}

impl SeedsConfig {
    pub fn is_empty(&self) -> bool {
        self.actresses.is_empty() && self.labels.is_empty() && self.makers.is_empty()
    }

    /// All configured seeds, actresses first.
    pub fn seeds(&self) -> Vec<Seed> {
        let tagged = [
            (Category::Actress, &self.actresses),
            (Category::Label, &self.labels),
            (Category::Maker, &self.makers),
        ];
        tagged
            .into_iter()
            .flat_map(|(category, ids)| ids.iter().map(move |id| Seed::new(category, id.clone())))
            .collect()
    }
}
