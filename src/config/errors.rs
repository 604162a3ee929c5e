use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Path is not a file: {}", .0.display())]
    InputNotAFile(PathBuf),
    #[error("Input and output file paths must not be the same: {}", .0.display())]
    SamePaths(PathBuf),
    #[error("Could not resolve path {}: {error}", .path.display())]
    Resolve {
        path: PathBuf,
        error: io::Error
    },
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
    #[error("Delay must be a number of seconds greater than or equal to 0, got {0}")]
    InvalidDelay(f64),
    #[error("Request timeout must be at least 1 second")]
    InvalidTimeout,
    #[error("An API token is required, pass --token or set TRIPLE_API_TOKEN")]
    MissingToken,
    #[error("API endpoint must start with http:// or https://, got {0}")]
    InvalidEndpoint(String)
}
