use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, warn};

use crate::models::{RawRecord, Record};
use crate::source::errors::SourceError;

const DEFAULT_CAPACITY: usize = 256;

/// Lazy, single pass stream of records parsed from a CSV input.
///
/// Parsing runs on a blocking thread that hands records over through a bounded channel, so at
/// most `capacity` parsed records are buffered ahead of the consumer.
pub struct RecordSource {
    receiver: mpsc::Receiver<Result<Record, SourceError>>,
    reader: Option<JoinHandle<()>>
}

impl RecordSource {
    /// Opens the file at `path` and starts reading it.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|error| SourceError::open(path, error))?;

        Ok(Self::from_reader(file))
    }

    /// Starts reading from any byte stream. Must be called from within a tokio runtime.
    pub fn from_reader<R: Read + Send + 'static>(input: R) -> Self {
        Self::with_capacity(input, DEFAULT_CAPACITY)
    }

    pub fn with_capacity<R: Read + Send + 'static>(input: R, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let reader = spawn_csv_reader(input, sender);

        Self {
            receiver,
            reader: Some(reader)
        }
    }

    /// Returns the next record, or `None` once the input is exhausted.
    ///
    /// An error is always the last item: the reader stops at the first one.
    pub async fn next(&mut self) -> Option<Result<Record, SourceError>> {
        if let Some(item) = self.receiver.recv().await {
            return Some(item)
        }

        //NOTE: A closed channel also happens when the reader thread dies, which must not look like a clean end of file
        let reader = self.reader.take()?;

        match reader.await {
            Ok(()) => None,
            Err(error) => Some(Err(SourceError::ReaderStopped(error)))
        }
    }
}

fn spawn_csv_reader<R: Read + Send + 'static>(input: R, sender: mpsc::Sender<Result<Record, SourceError>>) -> JoinHandle<()> {
    spawn_blocking(move || {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(input));

        let headers = match reader.byte_headers() {
            Ok(headers) => StringRecord::from_byte_record_lossy(headers.clone()),
            Err(error) => {
                let _ = sender.blocking_send(Err(SourceError::Csv { row: 0, error }));
                return
            }
        };

        let mut raw = ByteRecord::new();
        let mut rows = 0u64;

        loop {
            let parsed = match reader.read_byte_record(&mut raw) {
                Ok(false) => break,
                Ok(true) => {
                    rows += 1;
                    decode(&raw, &headers, rows)
                }
                Err(error) => Err(SourceError::Csv { row: rows + 1, error })
            };

            let is_error = parsed.is_err();

            if sender.blocking_send(parsed).is_err() || is_error {
                break;
            }
        }

        debug!("CSV reader finished after {rows} rows");
    })
}

fn decode(raw: &ByteRecord, headers: &StringRecord, row: u64) -> Result<Record, SourceError> {
    //NOTE: Bytes that are not UTF-8 are replaced instead of failing the row, only the identifier can fail a row
    if raw.iter().any(|field| std::str::from_utf8(field).is_err()) {
        warn!("Row [{row}] contains bytes that are not valid UTF-8, they were replaced");
    }

    let fields = StringRecord::from_byte_record_lossy(raw.clone());
    let record = fields.deserialize::<RawRecord>(Some(headers))
        .map_err(|error| SourceError::Csv { row, error })?;

    Ok(Record::parse(record, row)?)
}
