use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::JoinError;

use crate::models::RecordError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Could not open input [{}]: {error}", .path.display())]
    Open {
        path: PathBuf,
        error: io::Error
    },
    #[error("Could not read input at row [{row}]: {error}")]
    Csv {
        row: u64,
        error: csv::Error
    },
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("Input reader stopped unexpectedly: {0}")]
    ReaderStopped(JoinError)
}

impl SourceError {
    pub fn open(path: &Path, error: io::Error) -> Self {
        Self::Open { path: path.to_path_buf(), error }
    }
}
