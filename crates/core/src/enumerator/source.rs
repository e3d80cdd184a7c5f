use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::DedupCache;
use crate::config::CatalogConfig;
use crate::fetcher::Fetcher;
use crate::item::Item;
use crate::metrics;

use super::page::{parse_catalog_page, ListedItem};
use super::{EnumerateError, Seed};

/// Walks catalog listings and yields items not yet in the cache.
pub struct SourceEnumerator {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<DedupCache>,
    config: CatalogConfig,
}

/// Loop state of one seed's walk.
struct Walk {
    seed: Seed,
    /// Page to fetch once `pending` is drained.
    next_url: Option<String>,
    subject: String,
    pending: VecDeque<ListedItem>,
    pages: usize,
}

impl SourceEnumerator {
    pub fn new(fetcher: Arc<dyn Fetcher>, cache: Arc<DedupCache>, config: CatalogConfig) -> Self {
        Self {
            fetcher,
            cache,
            config,
        }
    }

    /// Lazy stream of newly discovered items for `seed`.
    ///
    /// Pages are fetched one at a time, only once every item of the previous
    /// page has been consumed. A page that cannot be fetched ends the stream;
    /// a page without a recognizable subject header yields one
    /// [`EnumerateError`] and then ends it.
    pub fn stream(&self, seed: Seed) -> impl Stream<Item = Result<Item, EnumerateError>> + Send + '_ {
        let first = seed.listing_url(&self.config.base_url, &self.config.language);
        let walk = Walk {
            seed,
            next_url: Some(first),
            subject: String::new(),
            pending: VecDeque::new(),
            pages: 0,
        };
        stream::unfold(walk, move |walk| self.advance(walk))
    }

    async fn advance(&self, mut walk: Walk) -> Option<(Result<Item, EnumerateError>, Walk)> {
        loop {
            while let Some(listed) = walk.pending.pop_front() {
                if self.cache.contains(&listed.id).await {
                    debug!(item = %listed.id, "Already known, skipping");
                    continue;
                }
                let item = Item::new(listed.id, listed.title, walk.subject.clone());
                if self.cache.add_if_absent(item.clone()).await {
                    metrics::ITEMS_DISCOVERED.inc();
                    return Some((Ok(item), walk));
                }
            }

            let url = match walk.next_url.take() {
                Some(url) => url,
                None => {
                    info!(seed = %walk.seed, pages = walk.pages, "Catalog walk finished");
                    return None;
                }
            };

            let html = match self.fetcher.fetch_text(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(seed = %walk.seed, url = %url, error = %e, "Catalog page fetch failed, ending walk");
                    return None;
                }
            };

            let category = walk.seed.category;
            let Some(page) = parse_catalog_page(&html, &url, self.config.suffix_for(category)) else {
                return Some((Err(EnumerateError::MissingSubject { url, category }), walk));
            };

            metrics::CATALOG_PAGES
                .with_label_values(&[category.as_str()])
                .inc();
            walk.pages += 1;
            debug!(
                seed = %walk.seed,
                subject = %page.subject,
                items = page.items.len(),
                page = walk.pages,
                "Catalog page parsed"
            );

            walk.subject = page.subject;
            walk.pending = page.items.into();
            walk.next_url = page.next_url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::enumerator::Category;
    use crate::testing::fixtures::catalog_page;
    use crate::testing::MockFetcher;
    use futures::StreamExt;

    const BASE: &str = "http://catalog.test";

    fn config() -> CatalogConfig {
        CatalogConfig {
            base_url: BASE.to_string(),
            ..CatalogConfig::default()
        }
    }

    fn cache() -> Arc<DedupCache> {
        Arc::new(DedupCache::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_walks_all_pages_in_order() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_text(
            "http://catalog.test/cn/vl_star.php?s=ae5q",
            catalog_page(
                "Jane 所演出的影片",
                &[("ABC-1", "one"), ("ABC-2", "two")],
                Some("/cn/vl_star.php?s=ae5q&page=2"),
            ),
        );
        fetcher.add_text(
            "http://catalog.test/cn/vl_star.php?s=ae5q&page=2",
            catalog_page("Jane 所演出的影片", &[("ABC-3", "three")], None),
        );

        let cache = cache();
        let enumerator = SourceEnumerator::new(fetcher.clone(), cache.clone(), config());
        let items: Vec<Item> = enumerator
            .stream(Seed::new(Category::Actress, "ae5q"))
            .map(|r| r.unwrap())
            .collect()
            .await;

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["ABC-1", "ABC-2", "ABC-3"]);
        assert!(items.iter().all(|i| i.group == "Jane" && !i.is_resolved()));
        assert_eq!(cache.len().await, 3);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_known_items_are_not_yielded() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_text(
            "http://catalog.test/cn/vl_label.php?l=x1",
            catalog_page(
                "Label One 发行的影片",
                &[("ABC-1", "one"), ("ABC-2", "two"), ("ABC-1", "dup")],
                None,
            ),
        );

        let cache = cache();
        cache.add_if_absent(Item::new("ABC-2", "two", "Label One")).await;

        let enumerator = SourceEnumerator::new(fetcher, cache.clone(), config());
        let items: Vec<Item> = enumerator
            .stream(Seed::new(Category::Label, "x1"))
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ABC-1");
        assert_eq!(items[0].title, "one");
    }

    #[tokio::test]
    async fn test_pages_are_fetched_lazily() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_text(
            "http://catalog.test/cn/vl_maker.php?m=m1",
            catalog_page("Maker 制作的影片", &[("ABC-1", "one")], Some("?m=m1&page=2")),
        );
        fetcher.add_text(
            "http://catalog.test/cn/vl_maker.php?m=m1&page=2",
            catalog_page("Maker 制作的影片", &[("ABC-2", "two")], None),
        );

        let enumerator = SourceEnumerator::new(fetcher.clone(), cache(), config());
        let mut stream = Box::pin(enumerator.stream(Seed::new(Category::Maker, "m1")));

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id, "ABC-1");
        assert_eq!(fetcher.requests().len(), 1);

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.id, "ABC-2");
        assert_eq!(fetcher.requests().len(), 2);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_subject_is_fatal() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_text(
            "http://catalog.test/cn/vl_star.php?s=bad",
            catalog_page("Not a listing", &[("ABC-1", "one")], Some("?s=bad&page=2")),
        );

        let enumerator = SourceEnumerator::new(fetcher.clone(), cache(), config());
        let results: Vec<_> = enumerator
            .stream(Seed::new(Category::Actress, "bad"))
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(EnumerateError::MissingSubject {
                category: Category::Actress,
                ..
            })
        ));
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_ends_walk_quietly() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_text(
            "http://catalog.test/cn/vl_star.php?s=ae5q",
            catalog_page("Jane 所演出的影片", &[("ABC-1", "one")], Some("?s=ae5q&page=2")),
        );
        // page 2 is not registered and fails with 404

        let enumerator = SourceEnumerator::new(fetcher, cache(), config());
        let results: Vec<_> = enumerator
            .stream(Seed::new(Category::Actress, "ae5q"))
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }
}
