use thiserror::Error;

use crate::client::EnrichError;
use crate::sink::SinkError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    #[error(transparent)]
    Sink(#[from] SinkError)
}
