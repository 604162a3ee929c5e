use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::models::{Enrichment, Record};
use crate::sink::columns::{header, ENRICHED_COLUMNS, RAW_COLUMNS, RECORD_COLUMNS};
use crate::sink::errors::SinkError;

/// Writes one CSV row per enriched record to an async destination.
///
/// Rows are encoded in memory with the `csv` crate and then awaited into a bounded buffer in front
/// of the destination, so a slow destination suspends the caller instead of growing memory.
pub struct CsvSink<W> {
    destination: BufWriter<W>,
    encoder: WriterBuilder,
    rows: u64
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path` and writes the header row.
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).await.map_err(|error| SinkError::create(path, error))?;

        Self::open(file).await
    }
}

impl<W: AsyncWrite + Unpin> CsvSink<W> {
    /// Wraps `destination` and writes the header row before any data row.
    pub async fn open(destination: W) -> Result<Self, SinkError> {
        let mut encoder = WriterBuilder::new();
        encoder
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'));

        let mut sink = Self {
            destination: BufWriter::new(destination),
            encoder,
            rows: 0
        };

        sink.emit(header()).await?;

        Ok(sink)
    }

    /// Writes the row for one record, returning once the destination has taken the bytes.
    pub async fn write_one(&mut self, record: &Record, enrichment: &Enrichment) -> Result<(), SinkError> {
        let payload = enrichment.payload();
        let raw = enrichment.raw();

        let cells: Vec<String> = RECORD_COLUMNS.iter().map(|(_, cell)| cell(record))
            .chain(ENRICHED_COLUMNS.iter().map(|(_, cell)| payload.and_then(|payload| cell(payload))))
            .chain(RAW_COLUMNS.iter().map(|(_, cell)| cell(raw)))
            .map(Option::unwrap_or_default)
            .collect();

        self.emit(&cells).await?;
        self.rows += 1;

        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes everything buffered and shuts the destination down.
    pub async fn close(&mut self) -> Result<(), SinkError> {
        self.destination.flush().await?;
        self.destination.shutdown().await?;

        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.destination.into_inner()
    }

    async fn emit<I, T>(&mut self, fields: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>
    {
        let mut writer = self.encoder.from_writer(Vec::new());
        writer.write_record(fields)?;

        let line = writer.into_inner().map_err(|error| SinkError::Write(error.into_error()))?;
        self.destination.write_all(&line).await?;

        Ok(())
    }
}
