mod enrichment_client;
mod errors;

use std::future::Future;

use crate::models::{Enrichment, Record};

pub use enrichment_client::EnrichmentClient;
pub use errors::EnrichError;

/// Turns one record into one enrichment.
///
/// Expected remote failures are returned as `Ok(Enrichment::Failed(_))`; `Err` is reserved for
/// failures that should stop the whole run.
pub trait Enricher: Send + Sync {
    fn enrich(&self, record: &Record) -> impl Future<Output = Result<Enrichment, EnrichError>> + Send;
}
