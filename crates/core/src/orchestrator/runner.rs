//! Harvest pipeline implementation.

use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use crate::cache::DedupCache;
use crate::config::Config;
use crate::enumerator::{EnumerateError, Seed, SourceEnumerator};
use crate::fetcher::Fetcher;
use crate::item::Item;
use crate::output::{emit, MagnetSink, OutputError};
use crate::searcher::TorrentResolver;

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, RunSummary};

/// Receiving end of a stage queue shared by the stage's workers.
type Queue<T> = Arc<Mutex<mpsc::UnboundedReceiver<T>>>;

async fn next_job<T>(queue: &Queue<T>) -> Option<T> {
    queue.lock().await.recv().await
}

/// Runs enumeration, resolution and output over a set of seeds.
pub struct Harvester {
    config: OrchestratorConfig,
    cache: Arc<DedupCache>,
    enumerator: Arc<SourceEnumerator>,
    resolver: Arc<TorrentResolver>,
}

impl Harvester {
    pub fn new(
        config: OrchestratorConfig,
        cache: Arc<DedupCache>,
        enumerator: SourceEnumerator,
        resolver: TorrentResolver,
    ) -> Self {
        Self {
            config,
            cache,
            enumerator: Arc::new(enumerator),
            resolver: Arc::new(resolver),
        }
    }

    /// Wire a harvester whose enumerator and resolver share `fetcher`.
    pub fn from_config(config: &Config, fetcher: Arc<dyn Fetcher>, cache: Arc<DedupCache>) -> Self {
        let enumerator =
            SourceEnumerator::new(fetcher.clone(), cache.clone(), config.catalog.clone());
        let resolver = TorrentResolver::new(fetcher, config.index.clone());
        Self::new(config.orchestrator.clone(), cache, enumerator, resolver)
    }

    pub fn cache(&self) -> &Arc<DedupCache> {
        &self.cache
    }

    /// Run the pipeline to completion.
    ///
    /// Every discovered item is recorded in the cache and the cache is
    /// persisted once all stages drained, even when enumeration hit a fatal
    /// error. The first error (enumeration, worker, output, then persist) is
    /// returned after that.
    pub async fn run(
        &self,
        seeds: Vec<Seed>,
        sink: Arc<dyn MagnetSink>,
    ) -> Result<RunSummary, OrchestratorError> {
        let started = Instant::now();
        let mut summary = RunSummary {
            seeds: seeds.len(),
            started_at: Some(Utc::now()),
            ..RunSummary::default()
        };
        info!(
            seeds = seeds.len(),
            enumeration_workers = self.config.enumeration_workers,
            resolution_workers = self.config.resolution_workers,
            sink = sink.name(),
            "Harvest starting"
        );

        let (item_tx, item_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let enumeration = tokio::spawn(enumerate_stage(
            self.enumerator.clone(),
            self.config.enumeration_workers,
            seeds,
            item_tx,
        ));
        let resolution = tokio::spawn(resolve_stage(
            self.resolver.clone(),
            self.config.resolution_workers,
            item_rx,
            result_tx,
        ));

        let output = self.consume(result_rx, sink.as_ref(), &mut summary).await;
        let enumerated = join_stage("enumeration", enumeration).await;
        let resolved = join_stage("resolution", resolution).await;
        let persisted = self.cache.persist().await;

        summary.discovered = summary.resolved + summary.unresolved;
        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            discovered = summary.discovered,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            magnets = summary.magnets_written,
            elapsed_ms = summary.elapsed_ms,
            "Harvest finished"
        );

        enumerated?;
        resolved?;
        output?;
        persisted?;
        Ok(summary)
    }

    /// Output stage: record every result and write magnet lines until the
    /// result queue closes.
    async fn consume(
        &self,
        mut results: mpsc::UnboundedReceiver<Item>,
        sink: &dyn MagnetSink,
        summary: &mut RunSummary,
    ) -> Result<(), OutputError> {
        let mut failure = None;

        while let Some(item) = results.recv().await {
            if item.is_resolved() {
                summary.resolved += 1;
            } else {
                summary.unresolved += 1;
            }

            match emit(sink, &item).await {
                Ok(true) => summary.magnets_written += 1,
                Ok(false) => debug!(item = %item.id, "Unresolved, no magnet link"),
                Err(e) => {
                    error!(item = %item.id, error = %e, "Failed to write magnet link");
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }

            self.cache.record(item).await;
        }

        if let Err(e) = sink.flush().await {
            error!(sink = sink.name(), error = %e, "Failed to flush magnet output");
            if failure.is_none() {
                failure = Some(e);
            }
        }

        failure.map_or(Ok(()), Err)
    }
}

async fn join_stage(
    stage: &str,
    handle: JoinHandle<Result<usize, OrchestratorError>>,
) -> Result<usize, OrchestratorError> {
    handle
        .await
        .map_err(|e| OrchestratorError::Worker(format!("{} stage: {}", stage, e)))?
}

/// Walk all seeds with at most `workers` concurrent walks.
///
/// The first fatal error aborts the remaining walks. The item queue closes
/// when this returns.
async fn enumerate_stage(
    enumerator: Arc<SourceEnumerator>,
    workers: usize,
    seeds: Vec<Seed>,
    items: mpsc::UnboundedSender<Item>,
) -> Result<usize, OrchestratorError> {
    let workers = workers.clamp(1, seeds.len().max(1));
    let (seed_tx, seed_rx) = mpsc::unbounded_channel();
    for seed in seeds {
        // receiver is alive until the workers are done
        let _ = seed_tx.send(seed);
    }
    drop(seed_tx);
    let queue: Queue<Seed> = Arc::new(Mutex::new(seed_rx));

    let mut set = JoinSet::new();
    for worker in 0..workers {
        set.spawn(enumeration_worker(
            worker,
            enumerator.clone(),
            queue.clone(),
            items.clone(),
        ));
    }
    drop(items);

    let mut discovered = 0;
    let mut fatal: Option<OrchestratorError> = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(count)) => discovered += count,
            Ok(Err(e)) => {
                error!(error = %e, "Enumeration aborted");
                if fatal.is_none() {
                    fatal = Some(e.into());
                    set.abort_all();
                }
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                error!(error = %e, "Enumeration worker failed");
                if fatal.is_none() {
                    fatal = Some(OrchestratorError::Worker(e.to_string()));
                    set.abort_all();
                }
            }
        }
    }

    info!(discovered, "Enumeration stage finished");
    fatal.map_or(Ok(discovered), Err)
}

async fn enumeration_worker(
    worker: usize,
    enumerator: Arc<SourceEnumerator>,
    seeds: Queue<Seed>,
    items: mpsc::UnboundedSender<Item>,
) -> Result<usize, EnumerateError> {
    let mut discovered = 0;
    while let Some(seed) = next_job(&seeds).await {
        debug!(worker, seed = %seed, "Walking seed");
        let mut stream = pin!(enumerator.stream(seed));
        while let Some(next) = stream.next().await {
            let item = next?;
            discovered += 1;
            if items.send(item).is_err() {
                return Ok(discovered);
            }
        }
    }
    Ok(discovered)
}

/// Resolve queued items with `workers` concurrent resolutions. The result
/// queue closes when this returns.
async fn resolve_stage(
    resolver: Arc<TorrentResolver>,
    workers: usize,
    items: mpsc::UnboundedReceiver<Item>,
    results: mpsc::UnboundedSender<Item>,
) -> Result<usize, OrchestratorError> {
    let queue: Queue<Item> = Arc::new(Mutex::new(items));

    let mut set = JoinSet::new();
    for _ in 0..workers.max(1) {
        set.spawn(resolution_worker(
            resolver.clone(),
            queue.clone(),
            results.clone(),
        ));
    }
    drop(results);

    let mut handled = 0;
    let mut failure = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(count) => handled += count,
            Err(e) => {
                error!(error = %e, "Resolution worker failed");
                if failure.is_none() {
                    failure = Some(OrchestratorError::Worker(e.to_string()));
                }
            }
        }
    }

    info!(handled, "Resolution stage finished");
    failure.map_or(Ok(handled), Err)
}

async fn resolution_worker(
    resolver: Arc<TorrentResolver>,
    items: Queue<Item>,
    results: mpsc::UnboundedSender<Item>,
) -> usize {
    let mut handled = 0;
    while let Some(item) = next_job(&items).await {
        let item = resolver.resolve(item).await;
        handled += 1;
        if results.send(item).is_err() {
            break;
        }
    }
    handled
}
