use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::item::Item;

use super::{CacheError, CacheStore};

/// Persisted shape: identity -> item record, key-sorted for stable diffs.
pub type CacheSnapshot = BTreeMap<String, Item>;

/// Stores the snapshot as indented JSON, rewriting the whole file each save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl CacheStore for JsonFileStore {
    fn name(&self) -> &str {
        "json_file"
    }

    fn load(&self) -> Result<CacheSnapshot, CacheError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CacheSnapshot::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(CacheSnapshot::new());
        }

        serde_json::from_slice(&content).map_err(|source| CacheError::Malformed {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        let mut json = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        snapshot.serialize(&mut serializer)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

/// Keeps the last saved snapshot in memory; used when no cache file is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<CacheSnapshot>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot, as if it had been persisted earlier.
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            saves: Mutex::new(0),
        }
    }

    /// The last saved snapshot.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.snapshot.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl CacheStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<CacheSnapshot, CacheError> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        if let Ok(mut stored) = self.snapshot.lock() {
            *stored = snapshot.clone();
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
