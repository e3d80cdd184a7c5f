//! Harvest lifecycle integration tests.
//!
//! These tests run the whole pipeline against canned catalog and index
//! pages, with the cache and magnet output on disk:
//! catalog walk -> search -> selection -> descriptor decode -> magnet line

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use trawler_core::{
    decode_metainfo,
    testing::{fixtures, MockFetcher},
    CacheError, Category, Config, DedupCache, FileSink, Harvester, JsonFileStore, Seed,
};

/// Test helper holding the on-disk state shared between runs.
struct TestHarness {
    config: Config,
    cache_path: PathBuf,
    magnet_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.catalog.base_url = "http://catalog.test".to_string();
        config.index.base_url = "https://index.test".to_string();
        config.orchestrator.enumeration_workers = 2;
        config.orchestrator.resolution_workers = 4;

        Self {
            config,
            cache_path: temp_dir.path().join("cache.json"),
            magnet_path: temp_dir.path().join("magnets.txt"),
            _temp_dir: temp_dir,
        }
    }

    fn seeds() -> Vec<Seed> {
        vec![
            Seed::new(Category::Actress, "ae5q"),
            Seed::new(Category::Label, "b4da"),
        ]
    }

    /// Catalog with 3 items for the actress (two pages) and 2 for the label,
    /// all resolvable. Returns the fetcher and the expected magnet lines.
    fn site(&self) -> (Arc<MockFetcher>, Vec<String>) {
        let fetcher = Arc::new(MockFetcher::new());
        let seeds = Self::seeds();
        fixtures::serve_catalog(
            &fetcher,
            &self.config.catalog,
            &seeds[0],
            "Jane Doe",
            &[&[("ABC-101", "First"), ("ABC-102", "Second")], &[("ABC-103", "Third")]],
        );
        fixtures::serve_catalog(
            &fetcher,
            &self.config.catalog,
            &seeds[1],
            "Some Label",
            &[&[("XYZ-001", "Fourth"), ("XYZ-002", "Fifth")]],
        );

        let mut expected = Vec::new();
        for id in ["ABC-101", "ABC-102", "ABC-103", "XYZ-001", "XYZ-002"] {
            let torrent = fixtures::serve_resolvable(&fetcher, &self.config.index, id);
            let info_hash = decode_metainfo(&torrent).unwrap().info_hash;
            expected.push(format!("magnet:?xt=urn:btih:{}&dn={}", info_hash.to_hex(), id));
        }
        expected.sort();
        (fetcher, expected)
    }

    fn harvester(&self, fetcher: Arc<MockFetcher>) -> Result<Harvester, CacheError> {
        let store = Arc::new(JsonFileStore::new(&self.cache_path));
        let cache = Arc::new(DedupCache::load(store)?);
        Ok(Harvester::from_config(&self.config, fetcher, cache))
    }

    async fn sink(&self) -> Arc<FileSink> {
        Arc::new(
            FileSink::open(&self.magnet_path)
                .await
                .expect("Failed to open magnet output"),
        )
    }

    fn magnet_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = std::fs::read_to_string(&self.magnet_path)
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect();
        lines.sort();
        lines
    }
}

#[tokio::test]
async fn test_two_seeds_emit_one_magnet_line_per_item() {
    let harness = TestHarness::new();
    let (fetcher, expected) = harness.site();

    let harvester = harness.harvester(fetcher).unwrap();
    let summary = harvester
        .run(TestHarness::seeds(), harness.sink().await)
        .await
        .unwrap();

    assert_eq!(summary.seeds, 2);
    assert_eq!(summary.discovered, 5);
    assert_eq!(summary.resolved, 5);
    assert_eq!(summary.magnets_written, 5);
    assert_eq!(harness.magnet_lines(), expected);

    for line in harness.magnet_lines() {
        let hash = line
            .strip_prefix("magnet:?xt=urn:btih:")
            .and_then(|rest| rest.split('&').next())
            .unwrap();
        assert_eq!(hash.len(), 40);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}

#[tokio::test]
async fn test_cache_file_records_resolved_items() {
    let harness = TestHarness::new();
    let (fetcher, _) = harness.site();

    let harvester = harness.harvester(fetcher).unwrap();
    harvester
        .run(TestHarness::seeds(), harness.sink().await)
        .await
        .unwrap();

    let raw = std::fs::read_to_string(&harness.cache_path).unwrap();
    assert!(raw.starts_with("{\n    \""));
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &stored["ABC-103"];
    assert_eq!(entry["id"], "ABC-103");
    assert_eq!(entry["title"], "Third");
    assert_eq!(entry["group"], "Jane Doe");
    assert_eq!(entry["torrent_title"], "ABC-103.mp4");
    assert_eq!(entry["size"], 1024u64 * 1024 * 1024);
    assert_eq!(entry["info_hash"].as_str().map(str::len), Some(40));
    assert_eq!(stored["XYZ-002"]["group"], "Some Label");
}

#[tokio::test]
async fn test_second_run_emits_nothing_new() {
    let harness = TestHarness::new();

    let (fetcher, _) = harness.site();
    let first = harness.harvester(fetcher).unwrap();
    first
        .run(TestHarness::seeds(), harness.sink().await)
        .await
        .unwrap();
    let lines_after_first = harness.magnet_lines();

    // Restart: fresh cache loaded from disk, fresh site
    let (fetcher, _) = harness.site();
    let second = harness.harvester(fetcher.clone()).unwrap();
    for id in ["ABC-101", "ABC-102", "ABC-103", "XYZ-001", "XYZ-002"] {
        assert!(second.cache().contains(id).await, "{} should be cached", id);
    }

    let summary = second
        .run(TestHarness::seeds(), harness.sink().await)
        .await
        .unwrap();

    assert_eq!(summary.discovered, 0);
    assert_eq!(summary.magnets_written, 0);
    assert_eq!(harness.magnet_lines(), lines_after_first);
    assert!(fetcher
        .requests()
        .iter()
        .all(|url| url.starts_with("http://catalog.test/")));
}

#[tokio::test]
async fn test_new_items_on_second_run_are_emitted() {
    let harness = TestHarness::new();
    let (fetcher, _) = harness.site();
    harness
        .harvester(fetcher)
        .unwrap()
        .run(TestHarness::seeds(), harness.sink().await)
        .await
        .unwrap();

    let (fetcher, _) = harness.site();
    let seed = Seed::new(Category::Maker, "m9");
    fixtures::serve_catalog(
        &fetcher,
        &harness.config.catalog,
        &seed,
        "Maker",
        &[&[("ABC-101", "First"), ("NEW-001", "Brand new")]],
    );
    fixtures::serve_resolvable(&fetcher, &harness.config.index, "NEW-001");

    let summary = harness
        .harvester(fetcher)
        .unwrap()
        .run(vec![seed], harness.sink().await)
        .await
        .unwrap();

    assert_eq!(summary.discovered, 1);
    assert_eq!(harness.magnet_lines().len(), 6);
}

#[tokio::test]
async fn test_malformed_cache_is_fatal() {
    let harness = TestHarness::new();
    std::fs::write(&harness.cache_path, "{ not json").unwrap();

    let (fetcher, _) = harness.site();
    let result = harness.harvester(fetcher);
    assert!(matches!(result, Err(CacheError::Malformed { .. })));
}
