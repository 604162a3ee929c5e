use super::{Batcher, RecordSource, SourceError};

use std::io::{Cursor, Write};
use std::num::NonZeroUsize;

use anyhow::{anyhow, Result};
use proptest::prelude::*;
use tempfile::NamedTempFile;

use crate::models::{ChannelType, Record, RecordError, TransactionType};

fn create_csv(rows: usize) -> Cursor<Vec<u8>> {
    let mut content = String::from("transaction_id,merchant_name,transaction_type\n");

    for index in 0..rows {
        content.push_str(&format!("T{index},Merchant {index},invoice\n"));
    }

    Cursor::new(content.into_bytes())
}

fn batch_size(size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(size).ok_or_else(|| anyhow!("batch size must be positive"))
}

async fn collect_records(mut source: RecordSource) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    while let Some(result) = source.next().await {
        records.push(result?);
    }

    Ok(records)
}

async fn collect_batch_sizes(rows: usize, size: usize) -> Result<Vec<usize>> {
    let mut batcher = Batcher::new(RecordSource::from_reader(create_csv(rows)), batch_size(size)?);
    let mut sizes = Vec::new();

    while let Some(batch) = batcher.next_batch().await? {
        sizes.push(batch.len());
    }

    Ok(sizes)
}

#[tokio::test]
async fn test_source_yields_records_in_file_order() -> Result<()> {
    let records = collect_records(RecordSource::from_reader(create_csv(5))).await?;
    let identifiers: Vec<_> = records.iter().map(|record| record.transaction_id.as_str()).collect();

    assert_eq!(identifiers, vec!["T0", "T1", "T2", "T3", "T4"]);
    assert!(records.iter().all(|record| record.transaction_type == TransactionType::Invoice));

    Ok(())
}

#[tokio::test]
async fn test_source_ignores_unknown_columns_and_tolerates_short_rows() -> Result<()> {
    let content = "transaction_id,loyalty_tier,merchant_city,channel_type\n\
                   T1,gold,Madrid,pos\n\
                   T2,silver\n\
                   \n\
                   T3 , , Paris ,\n";

    let records = collect_records(RecordSource::from_reader(Cursor::new(content.as_bytes().to_vec()))).await?;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].merchant_city.as_deref(), Some("Madrid"));
    assert_eq!(records[0].channel_type, Some(ChannelType::Pos));
    assert_eq!(records[1].merchant_city, None);
    assert_eq!(records[1].channel_type, None);
    assert_eq!(records[2].transaction_id, "T3");
    assert_eq!(records[2].merchant_city.as_deref(), Some("Paris"));

    Ok(())
}

#[tokio::test]
async fn test_source_stops_on_missing_identifier() -> Result<()> {
    let content = "transaction_id,merchant_name\nT1,Acme\n,Nameless\nT3,Never read\n";
    let mut source = RecordSource::from_reader(Cursor::new(content.as_bytes().to_vec()));

    assert_eq!(source.next().await.ok_or_else(|| anyhow!("first row missing"))??.transaction_id, "T1");

    let error = source.next().await.ok_or_else(|| anyhow!("error missing"))?;

    assert!(matches!(error, Err(SourceError::Record(RecordError::MissingIdentifier { row: 2 }))));
    assert!(source.next().await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_source_replaces_invalid_utf8_and_keeps_reading() -> Result<()> {
    let mut content = b"transaction_id,merchant_name,merchant_city\nT1,Acme,Caf".to_vec();
    content.extend_from_slice(&[0xe9, b'\n']);
    content.extend_from_slice(b"T2,Globex,Paris\n");

    let records = collect_records(RecordSource::from_reader(Cursor::new(content))).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].transaction_id, "T1");
    assert_eq!(records[0].merchant_city.as_deref(), Some("Caf\u{FFFD}"));
    assert_eq!(records[1].merchant_city.as_deref(), Some("Paris"));

    Ok(())
}

#[tokio::test]
async fn test_source_opens_files_from_disk() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "transaction_id,merchant_name")?;
    writeln!(file, "T1,\"Acme, Inc\"")?;

    let records = collect_records(RecordSource::open(file.path())?).await?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].merchant_name.as_deref(), Some("Acme, Inc"));

    Ok(())
}

#[test]
fn test_source_fails_to_open_missing_file() {
    let result = RecordSource::open(std::path::Path::new("does-not-exist.csv"));

    assert!(matches!(result, Err(SourceError::Open { .. })));
}

#[tokio::test]
async fn test_batcher_emits_full_windows_then_remainder() -> Result<()> {
    assert_eq!(collect_batch_sizes(25, 10).await?, vec![10, 10, 5]);
    assert_eq!(collect_batch_sizes(20, 10).await?, vec![10, 10]);
    assert_eq!(collect_batch_sizes(1, 10).await?, vec![1]);
    assert_eq!(collect_batch_sizes(0, 10).await?, Vec::<usize>::new());

    Ok(())
}

#[tokio::test]
async fn test_batcher_lookahead_does_not_lose_records() -> Result<()> {
    let mut batcher = Batcher::new(RecordSource::from_reader(create_csv(4)), batch_size(2)?);
    let mut identifiers = Vec::new();

    assert!(batcher.has_more().await?);
    assert!(batcher.has_more().await?);

    while let Some(batch) = batcher.next_batch().await? {
        identifiers.extend(batch.into_iter().map(|record| record.transaction_id));
        let _ = batcher.has_more().await?;
    }

    assert_eq!(identifiers, vec!["T0", "T1", "T2", "T3"]);
    assert!(!batcher.has_more().await?);

    Ok(())
}

#[tokio::test]
async fn test_batcher_propagates_source_errors() -> Result<()> {
    let content = "transaction_id\nT1\nT2\n\"\"\n";
    let mut batcher = Batcher::new(RecordSource::from_reader(Cursor::new(content.as_bytes().to_vec())), batch_size(10)?);

    assert!(matches!(batcher.next_batch().await, Err(SourceError::Record(_))));

    Ok(())
}

proptest! {
    #[test]
    fn batch_count_and_sizes_follow_the_window_size(rows in 0usize..60, size in 1usize..15) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let sizes = runtime.block_on(collect_batch_sizes(rows, size)).map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(sizes.len(), rows.div_ceil(size));
        prop_assert_eq!(sizes.iter().sum::<usize>(), rows);

        if let Some((last, full)) = sizes.split_last() {
            prop_assert!(full.iter().all(|batch| *batch == size));
            prop_assert_eq!(*last, if rows % size == 0 { size } else { rows % size });
        }
    }
}
