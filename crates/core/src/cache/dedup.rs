use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::item::Item;

use super::{CacheError, CacheSnapshot, CacheStore};

/// Concurrency-safe identity -> item map with check-and-insert semantics.
///
/// Reads take the shared lock, inserts the exclusive one. Every successful
/// insert writes a full snapshot to the store while still holding the lock,
/// so the stored state always includes every insert that returned before it.
pub struct DedupCache {
    items: RwLock<HashMap<String, Item>>,
    store: Arc<dyn CacheStore>,
}

impl DedupCache {
    /// Empty cache that persists to `store`, ignoring anything already stored.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Hydrate from `store`. A malformed snapshot is returned as an error.
    pub fn load(store: Arc<dyn CacheStore>) -> Result<Self, CacheError> {
        let snapshot = store.load()?;
        info!(store = store.name(), items = snapshot.len(), "Cache loaded");
        Ok(Self {
            items: RwLock::new(snapshot.into_iter().collect()),
            store,
        })
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.items.read().await.contains_key(id)
    }

    /// Insert `item` unless its identity is already known.
    ///
    /// Returns `true` only for the caller whose insert took effect. A failed
    /// persist is logged; the item stays inserted and the final persist will
    /// retry writing it.
    pub async fn add_if_absent(&self, item: Item) -> bool {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return false;
        }

        debug!(item = %item.id, "Caching new item");
        items.insert(item.id.clone(), item);

        let snapshot: CacheSnapshot = items
            .iter()
            .map(|(id, item)| (id.clone(), item.clone()))
            .collect();
        if let Err(e) = self.save(snapshot).await {
            warn!(error = %e, "Failed to persist cache after insert");
        }
        true
    }

    /// Replace the stored record for an existing identity (e.g. after resolution).
    ///
    /// Does not persist; call [`persist`](Self::persist) at the end of the run.
    pub async fn record(&self, item: Item) {
        let mut items = self.items.write().await;
        items.insert(item.id.clone(), item);
    }

    pub async fn get(&self, id: &str) -> Option<Item> {
        self.items.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        self.items
            .read()
            .await
            .iter()
            .map(|(id, item)| (id.clone(), item.clone()))
            .collect()
    }

    /// Write the full current state to the store.
    pub async fn persist(&self) -> Result<(), CacheError> {
        let items = self.items.read().await;
        let snapshot: CacheSnapshot = items
            .iter()
            .map(|(id, item)| (id.clone(), item.clone()))
            .collect();
        let count = snapshot.len();
        self.save(snapshot).await?;
        info!(store = self.store.name(), items = count, "Cache persisted");
        Ok(())
    }

    async fn save(&self, snapshot: CacheSnapshot) -> Result<(), CacheError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| CacheError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{JsonFileStore, MemoryStore};
    use crate::metainfo::InfoHash;
    use tempfile::TempDir;

    fn item(id: &str) -> Item {
        Item::new(id, format!("Title of {}", id), "Group")
    }

    #[tokio::test]
    async fn test_add_if_absent_is_idempotent() {
        let cache = DedupCache::new(Arc::new(MemoryStore::new()));

        assert!(!cache.contains("A-1").await);
        assert!(cache.add_if_absent(item("A-1")).await);
        assert!(cache.contains("A-1").await);
        assert!(!cache.add_if_absent(item("A-1")).await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_insert_does_not_overwrite() {
        let cache = DedupCache::new(Arc::new(MemoryStore::new()));
        cache.add_if_absent(item("A-1")).await;

        let mut other = item("A-1");
        other.title = "Different".to_string();
        cache.add_if_absent(other).await;

        assert_eq!(cache.get("A-1").await.unwrap().title, "Title of A-1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_admit_exactly_one_winner() {
        let cache = Arc::new(DedupCache::new(Arc::new(MemoryStore::new())));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.add_if_absent(item("RACE-1")).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_each_insert_persists_full_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let cache = DedupCache::new(store.clone());

        cache.add_if_absent(item("A-1")).await;
        cache.add_if_absent(item("A-2")).await;
        cache.add_if_absent(item("A-2")).await;

        assert_eq!(store.save_count(), 2);
        let saved = store.snapshot();
        assert!(saved.contains_key("A-1"));
        assert!(saved.contains_key("A-2"));
    }

    #[tokio::test]
    async fn test_record_updates_without_persisting() {
        let store = Arc::new(MemoryStore::new());
        let cache = DedupCache::new(store.clone());
        cache.add_if_absent(item("A-1")).await;

        let mut resolved = item("A-1");
        resolved.info_hash = Some(InfoHash::new([3; 20]));
        resolved.size = 99;
        cache.record(resolved).await;

        assert_eq!(store.save_count(), 1);
        assert!(store.snapshot()["A-1"].info_hash.is_none());

        cache.persist().await.unwrap();
        assert_eq!(store.snapshot()["A-1"].size, 99);
    }

    #[tokio::test]
    async fn test_reload_from_file_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let cache = DedupCache::new(Arc::new(JsonFileStore::new(&path)));
        cache.add_if_absent(item("A-1")).await;
        cache.add_if_absent(item("A-2")).await;
        drop(cache);

        let reloaded = DedupCache::load(Arc::new(JsonFileStore::new(&path))).unwrap();
        assert!(reloaded.contains("A-1").await);
        assert!(reloaded.contains("A-2").await);
        assert!(!reloaded.add_if_absent(item("A-1")).await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_file_store_writes_from_single_threaded_runtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = DedupCache::new(Arc::new(JsonFileStore::new(&path)));

        assert!(cache.add_if_absent(item("A-1")).await);
        cache.persist().await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"A-1\""));
    }

    #[test]
    fn test_load_malformed_snapshot_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = DedupCache::load(Arc::new(JsonFileStore::new(&path)));
        assert!(matches!(result, Err(CacheError::Malformed { .. })));
    }
}
