//! Mock fetcher for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::fetcher::{FetchError, FetchGate, Fetcher};

#[derive(Debug, Clone)]
enum Response {
    Body(Bytes),
    Status(u16),
}

/// URL-keyed canned responses.
///
/// Unregistered URLs answer with HTTP 404. Every requested URL is recorded
/// in order. With [`with_gate`](Self::with_gate) each request holds a permit
/// like [`HttpFetcher`](crate::fetcher::HttpFetcher) does, and the highest
/// number of requests seen at once is tracked.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Response>>,
    requests: Mutex<Vec<String>>,
    gate: Option<FetchGate>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a permit from `gate` around every request.
    pub fn with_gate(mut self, gate: FetchGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Sleep this long inside every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_text(&self, url: &str, body: impl Into<String>) {
        self.insert(url, Response::Body(Bytes::from(body.into())));
    }

    pub fn add_bytes(&self, url: &str, body: impl Into<Bytes>) {
        self.insert(url, Response::Body(body.into()));
    }

    /// Answer `url` with a non-success HTTP status.
    pub fn fail(&self, url: &str, status: u16) {
        self.insert(url, Response::Status(status));
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    /// Most requests that were in progress at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn insert(&self, url: &str, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let _permit = match &self.gate {
            Some(gate) => Some(gate.acquire().await?),
            None => None,
        };

        self.requests.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(Response::Body(body)) => Ok(body),
            Some(Response::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
