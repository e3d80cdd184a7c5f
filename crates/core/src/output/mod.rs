//! Magnet link output.
//!
//! Every resolved item becomes one line
//! `magnet:?xt=urn:btih:<hex>&dn=<identity>` written to a [`MagnetSink`].

mod sinks;

pub use sinks::{FileSink, LogSink, MemorySink};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::item::Item;
use crate::metrics::MAGNETS_WRITTEN;

/// Errors writing magnet lines.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write magnet output {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for magnet lines.
#[async_trait]
pub trait MagnetSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Append one line (without terminator).
    async fn write_line(&self, line: &str) -> Result<(), OutputError>;

    /// Make everything written so far durable.
    async fn flush(&self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Write the magnet line of `item` if it is resolved.
///
/// Returns whether a line was written.
pub async fn emit(sink: &dyn MagnetSink, item: &Item) -> Result<bool, OutputError> {
    let Some(link) = item.magnet_link() else {
        return Ok(false);
    };
    sink.write_line(&link).await?;
    MAGNETS_WRITTEN.inc();
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metainfo::InfoHash;

    #[tokio::test]
    async fn test_emit_only_resolved_items() {
        let sink = MemorySink::new();

        let unresolved = Item::new("ABC-1", "t", "g");
        assert!(!emit(&sink, &unresolved).await.unwrap());

        let mut resolved = Item::new("ABC 2", "t", "g");
        resolved.info_hash = Some(InfoHash::new([0xAB; 20]));
        assert!(emit(&sink, &resolved).await.unwrap());

        assert_eq!(
            sink.lines(),
            vec![format!("magnet:?xt=urn:btih:{}&dn=ABC%202", "ab".repeat(20))]
        );
    }
}
