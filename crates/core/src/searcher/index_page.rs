//! Index site search markup.
//!
//! A search either lands on a detail page (`.container`) describing exactly
//! one torrent, or on a listing with one `.tlistrow` per hit. Both expose a
//! title, a download link, a size text and a `trusted` class.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::fetcher::resolve_link;

use super::size::parse_size;
use super::Candidate;

static DETAIL_MARKER: Lazy<Selector> = Lazy::new(|| Selector::parse(".container").unwrap());
static DETAIL_NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".viewtorrentname").unwrap());
static DETAIL_DOWNLOAD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".viewdownloadbutton a").unwrap());
static DETAIL_SIZE: Lazy<Selector> = Lazy::new(|| Selector::parse(".viewtable .vtop").unwrap());
static DETAIL_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse(".content").unwrap());

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse(".tlistrow").unwrap());
static ROW_NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".tlistname").unwrap());
static ROW_DOWNLOAD: Lazy<Selector> = Lazy::new(|| Selector::parse(".tlistdownload a").unwrap());
static ROW_SIZE: Lazy<Selector> = Lazy::new(|| Selector::parse(".tlistsize").unwrap());

const TRUSTED: &str = "trusted";

/// Extract every candidate from a search response fetched from `page_url`.
///
/// Hits without a resolvable download link are dropped; nothing else is
/// filtered here.
pub fn parse_search_page(html: &str, page_url: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);

    if document.select(&DETAIL_MARKER).next().is_some() {
        return parse_detail(&document, page_url).into_iter().collect();
    }

    document
        .select(&ROW)
        .filter_map(|row| {
            let href = row
                .select(&ROW_DOWNLOAD)
                .next()
                .and_then(|a| a.value().attr("href"))?;
            Some(Candidate {
                title: first_text(row, &ROW_NAME),
                url: resolve_link(page_url, href)?,
                size: parse_size(&first_text(row, &ROW_SIZE)),
                trusted: has_class(row, TRUSTED),
            })
        })
        .collect()
}

fn parse_detail(document: &Html, page_url: &str) -> Option<Candidate> {
    let href = document
        .select(&DETAIL_DOWNLOAD)
        .next()
        .and_then(|a| a.value().attr("href"))?;

    let title = document
        .select(&DETAIL_NAME)
        .next()
        .map(text_of)
        .unwrap_or_default();
    let size = document
        .select(&DETAIL_SIZE)
        .last()
        .map(|cell| parse_size(&text_of(cell)))
        .unwrap_or(0);
    let trusted = document
        .select(&DETAIL_CONTENT)
        .any(|content| has_class(content, TRUSTED));

    Some(Candidate {
        title,
        url: resolve_link(page_url, href)?,
        size,
        trusted,
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
