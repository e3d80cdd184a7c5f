//! Torrent descriptor decoding.
//!
//! [`decode_metainfo`] turns the bytes of a `.torrent` file into a
//! [`MetaInfo`] record and computes its [`InfoHash`]: the SHA-1 of the
//! canonically re-encoded `info` dictionary.

mod error;
mod info_hash;
mod magnet;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use magnet::magnet_link;
pub use torrent::{decode_metainfo, FileEntry, MetaInfo};
