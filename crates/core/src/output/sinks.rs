use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{MagnetSink, OutputError};

/// Appends lines to a file, creating it if needed.
pub struct FileSink {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

impl FileSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| OutputError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> OutputError {
        OutputError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl MagnetSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn write_line(&self, line: &str) -> Result<(), OutputError> {
        let mut file = self.file.lock().await;
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn flush(&self) -> Result<(), OutputError> {
        let mut file = self.file.lock().await;
        file.flush().await.map_err(|e| self.io_error(e))?;
        file.sync_data().await.map_err(|e| self.io_error(e))
    }
}

/// Logs each line at info level.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl MagnetSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn write_line(&self, line: &str) -> Result<(), OutputError> {
        info!(magnet = %line, "Magnet link");
        Ok(())
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MagnetSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_line(&self, line: &str) -> Result<(), OutputError> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
        Ok(())
    }
}
