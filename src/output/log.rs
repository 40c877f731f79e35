use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::OutputError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_entry(at: DateTime<Local>, line: &str) -> String {
    format!("[{}] {}\n", at.format(TIMESTAMP_FORMAT), line)
}

/// Append-only log of every line the tool printed. Each entry is flushed
/// as soon as it is written.
///
/// A sink that fails to write disables itself after reporting the first
/// error, so a broken log never stops a run.
#[derive(Debug)]
pub struct LogSink {
    path: Option<PathBuf>,
    writer: Option<File>,
}

impl LogSink {
    pub async fn open(path: &Path) -> Result<Self, OutputError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| OutputError::Open {
                kind: "log",
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            writer: Some(file),
        })
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub async fn append(&mut self, line: &str) -> Result<(), OutputError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let entry = format_entry(Local::now(), line);
        let written = match writer.write_all(entry.as_bytes()).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            self.writer = None;
            return Err(self.write_error(source));
        }
        Ok(())
    }

    /// Releases the file handle after a final flush.
    pub async fn close(mut self) -> Result<(), OutputError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        if let Err(source) = writer.flush().await {
            return Err(self.write_error(source));
        }
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> OutputError {
        OutputError::Write {
            kind: "log",
            path: self.path.clone().unwrap_or_default(),
            source,
        }
    }
}
