//! Test doubles and fixtures for the pipeline.
//!
//! [`MockFetcher`] serves canned responses by URL so the enumerator,
//! resolver and orchestrator can run without network access. The
//! [`fixtures`] module renders catalog and index pages in the markup the
//! parsers expect and builds small torrent descriptors.
//!
//! # Example
//!
//! ```rust,ignore
//! use trawler_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.add_text(
//!     "http://catalog.test/cn/vl_star.php?s=ae5q",
//!     fixtures::catalog_page("Jane 所演出的影片", &[("ABC-1", "title")], None),
//! );
//! fetcher.add_bytes(
//!     "https://index.test/download/1.torrent",
//!     fixtures::single_file_torrent("abc1.mp4", 1024),
//! );
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Page and descriptor builders.
pub mod fixtures {
    use bytes::Bytes;
    use std::collections::BTreeMap;

    use crate::bencode::{encode, Value};
    use crate::config::{CatalogConfig, IndexConfig};
    use crate::enumerator::Seed;
    use crate::searcher::search_url;

    use super::MockFetcher;

    const PIECE_LENGTH: i64 = 16 * 1024;

    /// Render a catalog listing page.
    ///
    /// `header` is the full `.boxtitle` text, e.g. `"Jane 所演出的影片"`.
    pub fn catalog_page(header: &str, items: &[(&str, &str)], next: Option<&str>) -> String {
        let blocks: String = items
            .iter()
            .map(|(id, title)| {
                format!(
                    r#"<div class="video" id="vid_{id}"><a href="./?v={id}" title="{title}"><div class="id">{id}</div><img src="x.jpg"><div class="title">{title}</div></a></div>"#,
                    id = id,
                    title = title
                )
            })
            .collect();
        let next = next
            .map(|href| format!(r#"<a class="page next" href="{}">&gt;</a>"#, href))
            .unwrap_or_default();
        format!(
            r##"<!DOCTYPE html><html><body><div id="rightcolumn"><div class="boxtitle">{}</div><div class="videothumblist"><div class="videos">{}</div></div><div class="page_selector"><a class="page first" href="#">1</a>{}</div></div></body></html>"##,
            header, blocks, next
        )
    }

    /// One index search hit as rendered by the index site.
    #[derive(Debug, Clone)]
    pub struct IndexRow {
        pub title: String,
        pub href: String,
        pub size: String,
        pub trusted: bool,
    }

    impl IndexRow {
        pub fn new(title: &str, href: &str, size: &str, trusted: bool) -> Self {
            Self {
                title: title.to_string(),
                href: href.to_string(),
                size: size.to_string(),
                trusted,
            }
        }
    }

    /// Render a multi-result search listing.
    pub fn search_listing(rows: &[IndexRow]) -> String {
        let rows: String = rows
            .iter()
            .map(|row| {
                let class = if row.trusted { "tlistrow trusted" } else { "tlistrow" };
                format!(
                    r#"<tr class="{}"><td class="tlisticon"></td><td class="tlistname"><a href="/?page=view&amp;tid=1">{}</a></td><td class="tlistdownload"><a href="{}">DL</a></td><td class="tlistsize">{}</td></tr>"#,
                    class, row.title, row.href, row.size
                )
            })
            .collect();
        format!(
            r#"<!DOCTYPE html><html><body><div class="content"><table class="tlist"><tr class="tlisthead"><th>Name</th></tr>{}</table></div></body></html>"#,
            rows
        )
    }

    /// Render a single-result detail page.
    pub fn search_detail(row: &IndexRow) -> String {
        let class = if row.trusted { "content trusted" } else { "content" };
        format!(
            r#"<!DOCTYPE html><html><body><div class="container"><div class="{}"><table class="viewtable"><tr><td class="thead">Name:</td><td class="viewtorrentname">{}</td></tr><tr><td class="thead">Seeders:</td><td class="vtop">3</td></tr><tr><td class="thead">File size:</td><td class="vtop">{}</td></tr></table><div class="viewdownloadbutton"><a href="{}">Download</a></div></div></div></body></html>"#,
            class, row.title, row.size, row.href
        )
    }

    /// Build a single-file descriptor of `length` bytes named `name`.
    pub fn single_file_torrent(name: &str, length: i64) -> Vec<u8> {
        let pieces = ((length + PIECE_LENGTH - 1) / PIECE_LENGTH).max(1) as usize;
        let mut info = BTreeMap::new();
        info.insert(Bytes::from_static(b"length"), Value::Integer(length));
        info.insert(Bytes::from_static(b"name"), Value::string(name));
        info.insert(Bytes::from_static(b"piece length"), Value::Integer(PIECE_LENGTH));
        info.insert(Bytes::from_static(b"pieces"), Value::from(&vec![0xab; pieces * 20][..]));

        let mut root = BTreeMap::new();
        root.insert(
            Bytes::from_static(b"announce"),
            Value::string("http://tracker.test/announce"),
        );
        root.insert(Bytes::from_static(b"info"), Value::Dict(info));
        encode(&Value::Dict(root))
    }

    /// Serve a paginated listing for `seed`, one page per element of `pages`.
    ///
    /// Page N > 1 lives at `<first page>&page=N`.
    pub fn serve_catalog(
        fetcher: &MockFetcher,
        catalog: &CatalogConfig,
        seed: &Seed,
        subject: &str,
        pages: &[&[(&str, &str)]],
    ) {
        let first = seed.listing_url(&catalog.base_url, &catalog.language);
        let header = format!("{} {}", subject, catalog.suffix_for(seed.category));
        let page_url = |n: usize| match n {
            1 => first.clone(),
            n => format!("{}&page={}", first, n),
        };

        for (index, items) in pages.iter().enumerate() {
            let number = index + 1;
            let next = (number < pages.len()).then(|| page_url(number + 1));
            fetcher.add_text(
                &page_url(number),
                catalog_page(&header, items, next.as_deref()),
            );
        }
    }

    /// Serve a trusted 1 GiB search hit for `id` and its descriptor.
    ///
    /// Returns the descriptor bytes.
    pub fn serve_resolvable(fetcher: &MockFetcher, index: &IndexConfig, id: &str) -> Vec<u8> {
        let download = format!(
            "{}/download/{}.torrent",
            index.base_url.trim_end_matches('/'),
            urlencoding::encode(id)
        );
        fetcher.add_text(
            &search_url(index, id),
            search_listing(&[IndexRow::new(id, &download, "1 GiB", true)]),
        );
        let torrent = single_file_torrent(&format!("{}.mp4", id), 1024 * 1024);
        fetcher.add_bytes(&download, torrent.clone());
        torrent
    }
}
