use std::num::NonZeroUsize;

use crate::models::Record;
use crate::source::errors::SourceError;
use crate::source::RecordSource;

/// Groups a record stream into windows of at most `batch_size` records.
///
/// Keeps one record of lookahead so callers can ask whether anything is left without
/// consuming it.
pub struct Batcher {
    source: RecordSource,
    batch_size: NonZeroUsize,
    peeked: Option<Record>,
    exhausted: bool
}

impl Batcher {
    pub fn new(source: RecordSource, batch_size: NonZeroUsize) -> Self {
        Self {
            source,
            batch_size,
            peeked: None,
            exhausted: false
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Pulls the next window. Full windows are returned as soon as they fill up, the last one may
    /// be short, and an exhausted source yields `None` rather than an empty batch.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<Record>>, SourceError> {
        let mut batch = Vec::with_capacity(self.batch_size.get());

        while batch.len() < self.batch_size.get() {
            match self.pull().await? {
                Some(record) => batch.push(record),
                None => break
            }
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    /// Whether at least one more record can be pulled.
    pub async fn has_more(&mut self) -> Result<bool, SourceError> {
        if self.peeked.is_none() {
            self.peeked = self.pull().await?;
        }

        Ok(self.peeked.is_some())
    }

    async fn pull(&mut self) -> Result<Option<Record>, SourceError> {
        if let Some(record) = self.peeked.take() {
            return Ok(Some(record))
        }

        if self.exhausted {
            return Ok(None)
        }

        match self.source.next().await {
            Some(result) => result.map(Some),
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}
