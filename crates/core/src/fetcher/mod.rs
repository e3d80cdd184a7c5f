//! Outbound HTTP access.
//!
//! Every network read in the pipeline goes through a [`Fetcher`]. The HTTP
//! implementation holds a [`FetchGate`] permit for each request, which caps
//! the number of simultaneous requests across all workers.

mod http;
mod rate_limiter;

pub use http::HttpFetcher;
pub use rate_limiter::{FetchGate, FetchPermit, GateStatus};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use thiserror::Error;

/// Errors that can occur while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Fetch gate closed")]
    GateClosed,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Source of raw documents by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body. Non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;

    /// GET `url` and decode the body as UTF-8, replacing invalid sequences.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Resolve `href` (absolute, root-relative, query-only or protocol-relative)
/// against the page it was found on.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    Url::parse(base)
        .and_then(|base| base.join(href.trim()))
        .map(String::from)
        .ok()
}
