pub mod log;
pub mod report;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::recorder::OutputRecord;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to open {kind} file: {path}: {source}")]
    Open {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {kind} file: {path}: {source}")]
    Write {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn render_json(records: &[OutputRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub(crate) async fn write_file(
    kind: &'static str,
    path: &Path,
    contents: &[u8],
) -> Result<(), OutputError> {
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|source| OutputError::Open {
            kind,
            path: path.to_path_buf(),
            source,
        })?;
    outfile
        .write_all(contents)
        .await
        .map_err(|source| OutputError::Write {
            kind,
            path: path.to_path_buf(),
            source,
        })?;
    outfile.flush().await.map_err(|source| OutputError::Write {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every record as one pretty-printed JSON array, replacing any
/// previous result file.
pub async fn write_results(path: &Path, records: &[OutputRecord]) -> Result<(), OutputError> {
    write_file("result", path, &render_json(records)).await
}
