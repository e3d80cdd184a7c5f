use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::item::Item;
use crate::metainfo::{MetaInfo, MetainfoError};

/// One search hit under consideration for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    /// Absolute descriptor download URL.
    pub url: String,
    /// Size in bytes as advertised by the index; 0 when unparsable.
    pub size: u64,
    /// Index-asserted provenance marker.
    pub trusted: bool,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub candidate: Candidate,
    pub metainfo: MetaInfo,
}

impl Resolution {
    /// Fill the torrent fields of `item` from this resolution.
    pub fn apply(self, mut item: Item) -> Item {
        item.torrent_url = Some(self.candidate.url);
        item.torrent_title = Some(self.metainfo.name);
        item.info_hash = Some(self.metainfo.info_hash);
        item.size = self.candidate.size;
        item
    }
}

/// Per-item resolution failures. None of these stop the pipeline.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Search for {id} failed: {source}")]
    Search {
        id: String,
        #[source]
        source: FetchError,
    },

    #[error("No index result matches {0}")]
    NoCandidates(String),

    #[error("Descriptor download failed: {0}")]
    Download(#[source] FetchError),

    #[error("Descriptor from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: MetainfoError,
    },
}

impl ResolveError {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolveError::Search { .. } | ResolveError::Download(_) => "fetch_failed",
            ResolveError::NoCandidates(_) => "no_candidates",
            ResolveError::Decode { .. } => "decode_failed",
        }
    }
}
