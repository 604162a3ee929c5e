use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Could not create output [{}]: {error}", .path.display())]
    Create {
        path: PathBuf,
        error: io::Error
    },
    #[error("Could not encode output row: {0}")]
    Encode(#[from] csv::Error),
    #[error("Could not write output: {0}")]
    Write(#[from] io::Error)
}

impl SinkError {
    pub fn create(path: &Path, error: io::Error) -> Self {
        Self::Create { path: path.to_path_buf(), error }
    }
}
