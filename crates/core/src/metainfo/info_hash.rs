use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

use super::error::MetainfoError;

/// 20-byte SHA-1 digest identifying a torrent's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// SHA-1 of `data`, which should be the canonical encoding of an info dictionary.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha1::digest(data).into())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, MetainfoError> {
        <[u8; 20]>::try_from(bytes)
            .map(Self)
            .map_err(|_| MetainfoError::InvalidInfoHash(format!("{} bytes", bytes.len())))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for InfoHash {
    type Err = MetainfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| MetainfoError::InvalidInfoHash(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for InfoHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for InfoHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
