use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::fetcher::Fetcher;
use crate::item::Item;
use crate::metainfo::decode_metainfo;
use crate::metrics::RESOLUTIONS;

use super::index_page::parse_search_page;
use super::matcher::IdentityMatcher;
use super::selection::{rank_candidates, select_candidate};
use super::{Candidate, Resolution, ResolveError};

/// Index search URL for an identity.
pub fn search_url(config: &IndexConfig, id: &str) -> String {
    format!(
        "{}/?page=search&cats={}&sort={}&term={}",
        config.base_url.trim_end_matches('/'),
        config.category,
        config.sort,
        urlencoding::encode(id)
    )
}

/// Resolves catalog items to torrent descriptors on the index site.
pub struct TorrentResolver {
    fetcher: Arc<dyn Fetcher>,
    config: IndexConfig,
}

impl TorrentResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: IndexConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn search_url(&self, id: &str) -> String {
        search_url(&self.config, id)
    }

    /// Resolve `item`, returning it unchanged (unresolved) on any failure.
    pub async fn resolve(&self, item: Item) -> Item {
        match self.try_resolve(&item).await {
            Ok(resolution) => {
                RESOLUTIONS.with_label_values(&["resolved"]).inc();
                info!(
                    item = %item.id,
                    info_hash = %resolution.metainfo.info_hash,
                    size = resolution.candidate.size,
                    trusted = resolution.candidate.trusted,
                    "Resolved"
                );
                resolution.apply(item)
            }
            Err(e) => {
                RESOLUTIONS.with_label_values(&[e.outcome()]).inc();
                warn!(item = %item.id, error = %e, "Resolution failed");
                item
            }
        }
    }

    /// Search, select and decode, reporting why resolution failed.
    pub async fn try_resolve(&self, item: &Item) -> Result<Resolution, ResolveError> {
        let candidates = rank_candidates(self.search(&item.id).await?);
        let candidate = select_candidate(&candidates, self.config.size_tolerance_bytes)
            .cloned()
            .ok_or_else(|| ResolveError::NoCandidates(item.id.clone()))?;
        debug!(
            item = %item.id,
            candidates = candidates.len(),
            selected = %candidate.title,
            "Candidate selected"
        );

        let body = self
            .fetcher
            .fetch(&candidate.url)
            .await
            .map_err(ResolveError::Download)?;
        let metainfo = decode_metainfo(&body).map_err(|source| ResolveError::Decode {
            url: candidate.url.clone(),
            source,
        })?;

        Ok(Resolution {
            candidate,
            metainfo,
        })
    }

    /// Every index hit whose title matches `id`, in listing order.
    pub async fn search(&self, id: &str) -> Result<Vec<Candidate>, ResolveError> {
        let url = self.search_url(id);
        let html = self
            .fetcher
            .fetch_text(&url)
            .await
            .map_err(|source| ResolveError::Search {
                id: id.to_string(),
                source,
            })?;

        let matcher = IdentityMatcher::new(id);
        let candidates: Vec<Candidate> = parse_search_page(&html, &url)
            .into_iter()
            .filter(|c| matcher.matches(&c.title))
            .collect();
        debug!(item = %id, matched = candidates.len(), "Search parsed");
        Ok(candidates)
    }
}
