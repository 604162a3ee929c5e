use std::num::NonZeroUsize;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::client::{EnrichError, Enricher, EnrichmentClient};
use crate::config::Config;
use crate::engine::dispatcher::dispatch;
use crate::engine::errors::PipelineError;
use crate::models::Enrichment;
use crate::sink::CsvSink;
use crate::source::{Batcher, RecordSource};

/// Counters for one run, reported at the end and never persisted.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct RunSummary {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub batches: u64
}

impl RunSummary {
    fn count(&mut self, enrichment: &Enrichment) {
        self.total += 1;

        if enrichment.is_enriched() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

enum Phase {
    Streaming,
    Draining,
    Done,
    Fatal(PipelineError)
}

/// Streams records through the enrichment client one batch at a time.
///
/// Only one batch is ever in flight: it is dispatched, every outcome is written, and only then is
/// the next batch pulled. Memory and open connections are therefore bounded by the batch size.
pub struct Pipeline<E> {
    enricher: E,
    batch_size: NonZeroUsize,
    delay: Duration,
    report_progress: bool
}

impl Pipeline<EnrichmentClient> {
    /// Builds the HTTP client for the configured environment and credential.
    pub fn from_config(config: &Config) -> Result<Self, EnrichError> {
        let client = EnrichmentClient::new(config.base_url(), config.token().to_string(), config.timeout)?;
        debug!("Enrichment endpoint: {}", client.endpoint());

        Ok(Self::new(client, config.batch_size)
            .with_delay(config.delay)
            .with_progress(config.progress))
    }
}

impl<E: Enricher> Pipeline<E> {
    pub fn new(enricher: E, batch_size: NonZeroUsize) -> Self {
        Self {
            enricher,
            batch_size,
            delay: Duration::ZERO,
            report_progress: true
        }
    }

    /// Pause between two batches. Never applied after the last one.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_progress(mut self, report_progress: bool) -> Self {
        self.report_progress = report_progress;
        self
    }

    /// Runs until `source` is exhausted, writing one row per record to `sink`.
    ///
    /// The sink is closed on every exit path, including errors, so whatever was written before a
    /// failure is flushed and well formed.
    ///
    /// # Errors
    /// Returns `PipelineError` when the input cannot be read, a record is missing its identifier,
    /// the client fails for a reason unrelated to the remote API, or the output cannot be written.
    pub async fn run<W: AsyncWrite + Unpin>(&self, source: RecordSource, sink: &mut CsvSink<W>) -> Result<RunSummary, PipelineError> {
        let mut batcher = Batcher::new(source, self.batch_size);
        debug!("Streaming in batches of {} with {:?} between batches", batcher.batch_size(), self.delay);

        let mut summary = RunSummary::default();
        let mut phase = Phase::Streaming;

        loop {
            phase = match phase {
                Phase::Streaming => match self.stream_batch(&mut batcher, sink, &mut summary).await {
                    Ok(true) => Phase::Streaming,
                    Ok(false) => Phase::Draining,
                    Err(error) => Phase::Fatal(error)
                },
                Phase::Draining => {
                    debug!("Input exhausted after {} transactions, closing output with {} rows", summary.total, sink.rows());
                    sink.close().await?;
                    Phase::Done
                }
                Phase::Done => return Ok(summary),
                Phase::Fatal(error) => {
                    error!("Stopping after {} transactions: {error}", summary.total);

                    if let Err(close_error) = sink.close().await {
                        error!("Output could not be closed cleanly: {close_error}");
                    }

                    return Err(error)
                }
            };
        }
    }

    /// Processes one batch. Returns `false` once there was nothing left to pull.
    async fn stream_batch<W: AsyncWrite + Unpin>(&self, batcher: &mut Batcher, sink: &mut CsvSink<W>, summary: &mut RunSummary) -> Result<bool, PipelineError> {
        let Some(batch) = batcher.next_batch().await? else {
            return Ok(false)
        };

        let size = batch.len();
        let outcomes = dispatch(&self.enricher, batch).await?;

        for outcome in outcomes {
            sink.write_one(&outcome.record, &outcome.enrichment).await?;
            summary.count(&outcome.enrichment);

            if let Some(failure) = outcome.enrichment.failure() {
                warn!("Transaction [{}] was not enriched: {}", outcome.record.transaction_id, failure.reason);
            }
        }

        summary.batches += 1;

        if self.report_progress {
            info!(
                "Batch {} ({} transactions): processed {}, ok {}, failed {}",
                summary.batches, size, summary.total, summary.succeeded, summary.failed
            );
        }

        //NOTE: The delay paces requests between batches, it is never applied after the last one
        if !self.delay.is_zero() && batcher.has_more().await? {
            debug!("Waiting {:?} before the next batch", self.delay);
            sleep(self.delay).await;
        }

        Ok(true)
    }
}
