pub mod bencode;
pub mod cache;
pub mod config;
pub mod enumerator;
pub mod fetcher;
pub mod item;
pub mod metainfo;
pub mod metrics;
pub mod orchestrator;
pub mod output;
pub mod searcher;
pub mod testing;

pub use cache::{CacheError, CacheStore, DedupCache, JsonFileStore, MemoryStore};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
};
pub use enumerator::{Category, EnumerateError, Seed, SourceEnumerator};
pub use fetcher::{FetchError, FetchGate, Fetcher, HttpFetcher};
pub use item::Item;
pub use metainfo::{decode_metainfo, magnet_link, InfoHash, MetaInfo, MetainfoError};
pub use orchestrator::{Harvester, OrchestratorConfig, OrchestratorError, RunSummary};
pub use output::{FileSink, LogSink, MagnetSink, MemorySink, OutputError};
pub use searcher::{Candidate, ResolveError, TorrentResolver};
