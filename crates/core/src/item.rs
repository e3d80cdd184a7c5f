//! The record that flows through the pipeline and is persisted in the cache.

use serde::{Deserialize, Serialize};

use crate::metainfo::{magnet_link, InfoHash};

/// An item discovered on the catalog site.
///
/// Created unresolved by the enumerator; the resolver fills in the torrent
/// fields at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Catalog identity (e.g. "ABC-123"); unique across the cache.
    pub id: String,
    pub title: String,
    /// Subject of the listing the item was found under (actress, label, maker).
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<InfoHash>,
    /// Size of the selected torrent in bytes; 0 while unresolved.
    #[serde(default)]
    pub size: u64,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            group: group.into(),
            torrent_url: None,
            torrent_title: None,
            info_hash: None,
            size: 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.info_hash.is_some()
    }

    /// Magnet link for a resolved item, named after its identity.
    pub fn magnet_link(&self) -> Option<String> {
        self.info_hash.as_ref().map(|hash| magnet_link(hash, &self.id))
    }
}
