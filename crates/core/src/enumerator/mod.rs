//! Catalog enumeration.
//!
//! A [`Seed`] names one listing on the catalog site (an actress, label or
//! maker). [`SourceEnumerator`] walks that listing page by page and yields
//! every item whose identity the cache has not seen before.

mod page;
mod source;

pub use page::{parse_catalog_page, CatalogPage, ListedItem};
pub use source::SourceEnumerator;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of catalog listing a seed refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Actress,
    Label,
    Maker,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Actress => "actress",
            Category::Label => "label",
            Category::Maker => "maker",
        }
    }

    /// Listing script and its seed parameter.
    fn listing(&self) -> (&'static str, &'static str) {
        match self {
            Category::Actress => ("vl_star.php", "s"),
            Category::Label => ("vl_label.php", "l"),
            Category::Maker => ("vl_maker.php", "m"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchor of one enumeration stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed {
    pub category: Category,
    pub id: String,
}

impl Seed {
    pub fn new(category: Category, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
        }
    }

    /// First listing page for this seed under `base_url`/`language`.
    pub fn listing_url(&self, base_url: &str, language: &str) -> String {
        let (script, param) = self.category.listing();
        format!(
            "{}/{}/{}?{}={}",
            base_url.trim_end_matches('/'),
            language,
            script,
            param,
            urlencoding::encode(&self.id)
        )
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.id)
    }
}

/// Errors that abort enumeration of the whole run.
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("Catalog page {url} has no {category} subject header")]
    MissingSubject { url: String, category: Category },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_urls() {
        let base = "http://www.javlibrary.com/";
        assert_eq!(
            Seed::new(Category::Actress, "ae5q").listing_url(base, "cn"),
            "http://www.javlibrary.com/cn/vl_star.php?s=ae5q"
        );
        assert_eq!(
            Seed::new(Category::Label, "b4da").listing_url(base, "en"),
            "http://www.javlibrary.com/en/vl_label.php?l=b4da"
        );
        assert_eq!(
            Seed::new(Category::Maker, "arbq").listing_url(base, "cn"),
            "http://www.javlibrary.com/cn/vl_maker.php?m=arbq"
        );
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_string(&Category::Actress).unwrap(),
            "\"actress\""
        );
        let parsed: Category = serde_json::from_str("\"maker\"").unwrap();
        assert_eq!(parsed, Category::Maker);
    }

    #[test]
    fn test_seed_display() {
        assert_eq!(Seed::new(Category::Label, "x1").to_string(), "label:x1");
    }
}
