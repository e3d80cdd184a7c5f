//! Bencode codec.
//!
//! Torrent descriptors are bencoded: integers (`i42e`), length-prefixed byte
//! strings (`4:spam`), lists (`l...e`) and dictionaries (`d...e`) whose keys
//! are byte strings. Dictionaries are held in a `BTreeMap`, so [`encode`]
//! always writes keys in sorted order. That canonical form is what the info
//! hash is computed over, whatever order the original document used.

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_prefix};
pub use encode::encode;
pub use error::BencodeError;
pub use value::Value;
