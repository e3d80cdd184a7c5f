use thiserror::Error;

/// Errors produced while decoding bencoded data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BencodeError {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    #[error("invalid integer at byte {offset}: {reason}")]
    InvalidInteger { offset: usize, reason: String },

    #[error("invalid byte string length at byte {0}")]
    InvalidLength(usize),

    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    #[error("dictionary key at byte {0} is not a byte string")]
    NonStringKey(usize),

    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("{0} trailing bytes after value")]
    TrailingData(usize),
}
