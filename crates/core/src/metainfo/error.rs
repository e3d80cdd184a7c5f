use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur while decoding a torrent descriptor.
#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    #[error("top-level value is a {0}, expected a dictionary")]
    NotADictionary(&'static str),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    #[error("invalid info hash: {0}")]
    InvalidInfoHash(String),
}
