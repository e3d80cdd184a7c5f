//! Catalog listing markup.
//!
//! A listing page has a `.boxtitle` header of the form
//! `"<subject> <suffix>"`, one `.video` block per item with `.id` and
//! `.title` children, and an optional `.page.next` link.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::fetcher::resolve_link;

static HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse(".boxtitle").unwrap());
static ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse(".video").unwrap());
static ITEM_ID: Lazy<Selector> = Lazy::new(|| Selector::parse(".id").unwrap());
static ITEM_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".title").unwrap());
static NEXT_PAGE: Lazy<Selector> = Lazy::new(|| Selector::parse(".page.next").unwrap());

/// An item block as listed, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedItem {
    pub id: String,
    pub title: String,
}

/// Everything the enumerator needs from one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    /// Subject label extracted from the header.
    pub subject: String,
    pub items: Vec<ListedItem>,
    /// Absolute URL of the next page, if any.
    pub next_url: Option<String>,
}

/// Parse a listing page fetched from `page_url`.
///
/// Returns `None` when the header does not carry `subject_suffix`, since the
/// page cannot be attributed to anything.
pub fn parse_catalog_page(html: &str, page_url: &str, subject_suffix: &str) -> Option<CatalogPage> {
    let document = Html::parse_document(html);

    let header = document.select(&HEADER).next().map(element_text)?;
    let subject = extract_subject(&header, subject_suffix)?;

    let items = document
        .select(&ITEM)
        .filter_map(|block| {
            let id = block.select(&ITEM_ID).next().map(element_text)?;
            if id.is_empty() {
                return None;
            }
            let title = block
                .select(&ITEM_TITLE)
                .next()
                .map(element_text)
                .unwrap_or_default();
            Some(ListedItem { id, title })
        })
        .collect();

    let next_url = document
        .select(&NEXT_PAGE)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_link(page_url, href));

    Some(CatalogPage {
        subject,
        items,
        next_url,
    })
}

/// `"  Name   suffix "` -> `"Name"`; the subject must be separated from the suffix.
fn extract_subject(header: &str, suffix: &str) -> Option<String> {
    let head = header.trim().strip_suffix(suffix)?;
    if !head.ends_with(char::is_whitespace) {
        return None;
    }
    let subject = head.trim();
    (!subject.is_empty()).then(|| subject.to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
