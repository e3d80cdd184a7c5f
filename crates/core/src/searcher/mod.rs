//! Torrent resolution against the index site.
//!
//! [`TorrentResolver`] searches the index for an item's identity, keeps the
//! hits whose title matches that identity, picks one with
//! [`select_candidate`] and decodes its descriptor to obtain the info hash.

mod index_page;
mod matcher;
mod resolver;
mod selection;
mod size;
mod types;

pub use index_page::parse_search_page;
pub use matcher::IdentityMatcher;
pub use resolver::{search_url, TorrentResolver};
pub use selection::{rank_candidates, select_candidate};
pub use size::parse_size;
pub use types::*;
