//! reqwest-backed fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::metrics::FETCHES;

use super::rate_limiter::FetchGate;
use super::{FetchError, Fetcher};

/// HTTP fetcher sharing one [`FetchGate`] across all requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    gate: FetchGate,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            gate: FetchGate::new(config.max_concurrent_requests),
        })
    }

    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        // The permit only covers the request up to its status line.
        let response = {
            let _permit = self.gate.acquire().await?;
            debug!(url = url, "Fetching");
            self.client.get(url).send().await
        };

        let response = response.map_err(|e| {
            FETCHES.with_label_values(&["transport_error"]).inc();
            FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            FETCHES.with_label_values(&["http_error"]).inc();
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            FETCHES.with_label_values(&["transport_error"]).inc();
            FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;
        FETCHES.with_label_values(&["success"]).inc();
        Ok(body)
    }
}
