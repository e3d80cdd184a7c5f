use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::bencode::{decode_prefix, encode, Value};

use super::error::MetainfoError;
use super::info_hash::InfoHash;

const PIECE_DIGEST_LEN: usize = 20;

/// One file described by a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub length: u64,
    /// Path segments; for single-file torrents this is just the torrent name.
    pub path: Vec<String>,
    pub md5sum: Option<String>,
}

/// A decoded torrent descriptor.
#[derive(Debug, Clone)]
pub struct MetaInfo {
    pub info_hash: InfoHash,
    pub name: String,
    pub piece_length: u64,
    pub pieces: Vec<[u8; PIECE_DIGEST_LEN]>,
    pub files: Vec<FileEntry>,
    /// True when the info dictionary has a `files` list.
    pub multi_file: bool,
    pub private: bool,
    pub announce: Option<String>,
    pub announce_list: Vec<Vec<String>>,
    pub creation_date: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub encoding: Option<String>,
}

impl MetaInfo {
    pub fn total_length(&self) -> u64 {
        self.files.iter().map(|f| f.length).sum()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

/// Decode a `.torrent` document.
///
/// The info hash is taken over the canonical re-encoding of the `info`
/// value, so a document whose dictionaries are not key-sorted still yields
/// the same hash as its sorted equivalent. Optional top-level fields that are
/// missing or of the wrong type are left empty.
pub fn decode_metainfo(data: &[u8]) -> Result<MetaInfo, MetainfoError> {
    let (root, consumed) = decode_prefix(data)?;
    if consumed < data.len() {
        debug!(trailing = data.len() - consumed, "Ignoring bytes after torrent dictionary");
    }

    let root = match root {
        Value::Dict(d) => d,
        other => return Err(MetainfoError::NotADictionary(other.kind())),
    };

    let info_value = root
        .get(b"info".as_slice())
        .ok_or(MetainfoError::MissingField("info"))?;
    let info_hash = InfoHash::digest(&encode(info_value));
    let info = info_value
        .as_dict()
        .ok_or(MetainfoError::InvalidField("info"))?;

    let name = opt_string(info, "name")?.unwrap_or_default();
    let piece_length = opt_uint(info, "piece length")?.unwrap_or(0);
    let pieces = split_pieces(info)?;
    let private = opt_uint(info, "private")?.unwrap_or(0) == 1;

    let (files, multi_file) = match info.get(b"files".as_slice()) {
        Some(list) => (decode_files(list)?, true),
        None => {
            let length = opt_uint(info, "length")?.unwrap_or(0);
            let md5sum = opt_string(info, "md5sum")?;
            let entry = FileEntry {
                length,
                path: vec![name.clone()],
                md5sum,
            };
            (vec![entry], false)
        }
    };

    Ok(MetaInfo {
        info_hash,
        name,
        piece_length,
        pieces,
        files,
        multi_file,
        private,
        announce: lenient_string(&root, "announce"),
        announce_list: lenient_announce_list(&root),
        creation_date: root
            .get(b"creation date".as_slice())
            .and_then(Value::as_integer)
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        comment: lenient_string(&root, "comment"),
        created_by: lenient_string(&root, "created by"),
        encoding: lenient_string(&root, "encoding"),
    })
}

fn split_pieces(
    info: &BTreeMap<Bytes, Value>,
) -> Result<Vec<[u8; PIECE_DIGEST_LEN]>, MetainfoError> {
    let Some(value) = info.get(b"pieces".as_slice()) else {
        return Ok(Vec::new());
    };
    let bytes = value
        .as_bytes()
        .ok_or(MetainfoError::InvalidField("pieces"))?;
    if bytes.len() % PIECE_DIGEST_LEN != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }

    Ok(bytes
        .chunks_exact(PIECE_DIGEST_LEN)
        .map(|chunk| {
            let mut digest = [0u8; PIECE_DIGEST_LEN];
            digest.copy_from_slice(chunk);
            digest
        })
        .collect())
}

fn decode_files(value: &Value) -> Result<Vec<FileEntry>, MetainfoError> {
    let list = value.as_list().ok_or(MetainfoError::InvalidField("files"))?;
    list.iter()
        .map(|entry| {
            let dict = entry.as_dict().ok_or(MetainfoError::InvalidField("files"))?;
            let length = opt_uint(dict, "length")?.ok_or(MetainfoError::MissingField("length"))?;
            let path = dict
                .get(b"path".as_slice())
                .and_then(Value::as_list)
                .ok_or(MetainfoError::InvalidField("path"))?
                .iter()
                .map(|segment| {
                    segment
                        .as_bytes()
                        .map(|b| String::from_utf8_lossy(b).into_owned())
                        .ok_or(MetainfoError::InvalidField("path"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FileEntry {
                length,
                path,
                md5sum: opt_string(dict, "md5sum")?,
            })
        })
        .collect()
}

/// A byte-string field inside the info dictionary; wrong types are errors.
fn opt_string(
    dict: &BTreeMap<Bytes, Value>,
    key: &'static str,
) -> Result<Option<String>, MetainfoError> {
    match dict.get(key.as_bytes()) {
        None => Ok(None),
        Some(Value::Bytes(b)) => Ok(Some(String::from_utf8_lossy(b).into_owned())),
        Some(_) => Err(MetainfoError::InvalidField(key)),
    }
}

fn opt_uint(
    dict: &BTreeMap<Bytes, Value>,
    key: &'static str,
) -> Result<Option<u64>, MetainfoError> {
    match dict.get(key.as_bytes()) {
        None => Ok(None),
        Some(Value::Integer(i)) => u64::try_from(*i)
            .map(Some)
            .map_err(|_| MetainfoError::InvalidField(key)),
        Some(_) => Err(MetainfoError::InvalidField(key)),
    }
}

fn lenient_string(dict: &BTreeMap<Bytes, Value>, key: &str) -> Option<String> {
    dict.get(key.as_bytes())
        .and_then(Value::as_bytes)
        .map(|b| String::from_utf8_lossy(b).into_owned())
}

fn lenient_announce_list(dict: &BTreeMap<Bytes, Value>) -> Vec<Vec<String>> {
    let Some(tiers) = dict.get(b"announce-list".as_slice()).and_then(Value::as_list) else {
        return Vec::new();
    };
    tiers
        .iter()
        .filter_map(Value::as_list)
        .map(|tier| {
            tier.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .collect()
}
