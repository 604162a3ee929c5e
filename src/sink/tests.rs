use super::columns::{ENRICHED_COLUMNS, RAW_COLUMNS, RECORD_COLUMNS};
use super::CsvSink;

use std::time::Duration;

use anyhow::{anyhow, Result};
use proptest::prelude::*;
use serde_json::json;
use tokio::io::{duplex, AsyncReadExt};
use tokio::time::timeout;

use crate::models::{
    EnrichedPayload, Enrichment, FailureEnvelope, RawExchange, RawRecord, RawRequest, RawResponse, Record
};

fn create_record(transaction_id: &str, merchant_name: &str) -> Result<Record> {
    let raw = RawRecord {
        transaction_id: Some(transaction_id.to_string()),
        merchant_name: Some(merchant_name.to_string()),
        merchant_category_code: Some("5411".to_string()),
        channel_type: Some("pos".to_string()),
        ..RawRecord::default()
    };

    Ok(Record::parse(raw, 1)?)
}

fn create_exchange(record: &Record, status: Option<u16>) -> Result<RawExchange> {
    Ok(RawExchange {
        request: RawRequest {
            body: serde_json::to_value(record)?,
            headers: json!({ "content-type": "application/json" }),
            timestamp: "2026-01-01T00:00:00.000Z".to_string()
        },
        response: RawResponse {
            status,
            body: status.map(|_| json!({ "detail": "boom" })),
            headers: status.map(|_| json!({ "x-request-id": "abc" }))
        }
    })
}

fn create_enriched(record: &Record) -> Result<Enrichment> {
    let payload: EnrichedPayload = serde_json::from_value(json!({
        "transaction_id": record.transaction_id,
        "visual_enrichments": { "merchant_clean_name": "Acme", "default_logo": true },
        "fraud": { "enabled": true, "merchant_flagged": false },
        "categories": [{ "name": "Groceries" }, { "name": "Supermarkets" }]
    }))?;

    Ok(Enrichment::Enriched { payload, raw: create_exchange(record, Some(200))? })
}

fn create_failed(record: &Record, status: Option<u16>) -> Result<Enrichment> {
    Ok(Enrichment::Failed(FailureEnvelope {
        reason: "Remote returned 500".to_string(),
        raw: create_exchange(record, status)?
    }))
}

async fn write_rows(rows: &[(Record, Enrichment)]) -> Result<String> {
    let mut sink = CsvSink::open(Vec::new()).await?;

    for (record, enrichment) in rows {
        sink.write_one(record, enrichment).await?;
    }

    sink.close().await?;

    Ok(String::from_utf8(sink.into_inner())?)
}

fn parse_output(output: &str) -> Result<(csv::StringRecord, Vec<csv::StringRecord>)> {
    let mut reader = csv::Reader::from_reader(output.as_bytes());
    let header = reader.headers()?.clone();
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

    Ok((header, rows))
}

fn column(header: &csv::StringRecord, name: &str) -> Result<usize> {
    header.iter().position(|field| field == name).ok_or_else(|| anyhow!("column {name} missing"))
}

#[tokio::test]
async fn test_header_lists_record_then_outcome_columns() -> Result<()> {
    let output = write_rows(&[]).await?;
    let (header, rows) = parse_output(&output)?;

    assert!(rows.is_empty());
    assert_eq!(header.len(), RECORD_COLUMNS.len() + ENRICHED_COLUMNS.len() + RAW_COLUMNS.len());
    assert_eq!(header.len(), 54);
    assert_eq!(&header[0], "merchant_name");
    assert_eq!(&header[13], "vat");
    assert_eq!(&header[14], "triple_transaction_id");
    assert_eq!(&header[53], "triple_raw_response_headers");

    Ok(())
}

#[tokio::test]
async fn test_enriched_row_fills_enrichment_columns() -> Result<()> {
    let record = create_record("T1", "Acme")?;
    let enrichment = create_enriched(&record)?;
    let output = write_rows(&[(record, enrichment)]).await?;
    let (header, rows) = parse_output(&output)?;
    let row = &rows[0];

    assert_eq!(&row[column(&header, "transaction_id")?], "T1");
    assert_eq!(&row[column(&header, "merchant_category_code")?], "5411");
    assert_eq!(&row[column(&header, "channel_type")?], "POS");
    assert_eq!(&row[column(&header, "merchant_city")?], "");
    assert_eq!(&row[column(&header, "triple_visual_enrichments_merchant_clean_name")?], "Acme");
    assert_eq!(&row[column(&header, "triple_visual_enrichments_default_logo")?], "true");
    assert_eq!(&row[column(&header, "triple_fraud_merchant_flagged")?], "false");
    assert_eq!(&row[column(&header, "triple_category")?], "Groceries");
    assert_eq!(&row[column(&header, "triple_subcategory")?], "Supermarkets");
    assert_eq!(&row[column(&header, "triple_raw_response_status")?], "200");

    Ok(())
}

#[tokio::test]
async fn test_failed_row_leaves_enrichment_columns_empty() -> Result<()> {
    let record = create_record("T2", "Acme")?;
    let enrichment = create_failed(&record, Some(500))?;
    let output = write_rows(&[(record, enrichment)]).await?;
    let (header, rows) = parse_output(&output)?;
    let row = &rows[0];

    for (name, _) in ENRICHED_COLUMNS.iter() {
        assert_eq!(&row[column(&header, name)?], "", "{name} should be empty");
    }

    assert_eq!(&row[column(&header, "triple_raw_response_status")?], "500");
    assert_eq!(&row[column(&header, "triple_raw_response_body")?], r#"{"detail":"boom"}"#);
    assert_eq!(&row[column(&header, "triple_raw_request_headers")?], r#"{"content-type":"application/json"}"#);

    let request_body: serde_json::Value = serde_json::from_str(&row[column(&header, "triple_raw_request_body")?])?;
    assert_eq!(request_body["transaction_id"], json!("T2"));

    Ok(())
}

#[tokio::test]
async fn test_unavailable_response_parts_are_empty() -> Result<()> {
    let record = create_record("T3", "Acme")?;
    let enrichment = create_failed(&record, None)?;
    let output = write_rows(&[(record, enrichment)]).await?;
    let (header, rows) = parse_output(&output)?;

    assert_eq!(&rows[0][column(&header, "triple_raw_response_status")?], "");
    assert_eq!(&rows[0][column(&header, "triple_raw_response_body")?], "");
    assert_eq!(&rows[0][column(&header, "triple_raw_response_headers")?], "");

    Ok(())
}

#[tokio::test]
async fn test_special_characters_are_quoted() -> Result<()> {
    let record = create_record("T4", "Acme, \"The Best\"\nShop")?;
    let enrichment = create_failed(&record, Some(500))?;
    let output = write_rows(&[(record, enrichment)]).await?;

    assert!(output.lines().nth(1).is_some_and(|line| line.starts_with("\"Acme, \"\"The Best\"\"")));

    let (_, rows) = parse_output(&output)?;

    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "Acme, \"The Best\"\nShop");

    Ok(())
}

#[tokio::test]
async fn test_rows_follow_write_order() -> Result<()> {
    let mut rows = Vec::new();

    for index in 0..5 {
        let record = create_record(&format!("T{index}"), "Acme")?;
        let enrichment = if index % 2 == 0 { create_enriched(&record)? } else { create_failed(&record, Some(502))? };
        rows.push((record, enrichment));
    }

    let output = write_rows(&rows).await?;
    let (header, parsed) = parse_output(&output)?;
    let index = column(&header, "transaction_id")?;
    let identifiers: Vec<_> = parsed.iter().map(|row| row[index].to_string()).collect();

    assert_eq!(identifiers, vec!["T0", "T1", "T2", "T3", "T4"]);

    Ok(())
}

#[tokio::test]
async fn test_each_row_is_encoded_on_its_own_line() -> Result<()> {
    let first = create_record("T1", "Acme")?;
    let second = create_record("T2", "Globex")?;
    let rows = [(first.clone(), create_failed(&first, Some(500))?), (second.clone(), create_enriched(&second)?)];

    let output = write_rows(&rows).await?;
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("merchant_name,transaction_type,transaction_id,"));
    assert!(lines[1].starts_with("Acme,BANK_TRANSFER,T1,"));
    assert!(lines[2].starts_with("Globex,BANK_TRANSFER,T2,"));
    assert_eq!(output.matches("merchant_name,").count(), 1);
    assert!(output.ends_with('\n'));

    Ok(())
}

#[tokio::test]
async fn test_slow_destination_suspends_the_writer() -> Result<()> {
    let record = create_record("T1", "Acme")?;
    let enrichment = create_enriched(&record)?;
    let (writer, _reader) = duplex(64);
    let mut sink = CsvSink::open(writer).await?;

    let stalled = timeout(Duration::from_millis(200), async {
        for _ in 0..200 {
            sink.write_one(&record, &enrichment).await?;
        }

        Ok::<_, super::SinkError>(())
    }).await;

    assert!(stalled.is_err());

    Ok(())
}

#[tokio::test]
async fn test_draining_destination_receives_every_row() -> Result<()> {
    let record = create_record("T1", "Acme")?;
    let enrichment = create_enriched(&record)?;
    let (writer, mut reader) = duplex(64);

    let drain = tokio::spawn(async move {
        let mut output = String::new();
        reader.read_to_string(&mut output).await.map(|_| output)
    });

    let mut sink = CsvSink::open(writer).await?;

    for _ in 0..200 {
        sink.write_one(&record, &enrichment).await?;
    }

    sink.close().await?;
    assert_eq!(sink.rows(), 200);
    drop(sink);

    let output = drain.await??;
    let (_, rows) = parse_output(&output)?;

    assert_eq!(rows.len(), 200);

    Ok(())
}

proptest! {
    #[test]
    fn any_merchant_name_survives_quoting(name in "\\PC*") {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let name_for_record = if name.trim().is_empty() { "x".to_string() } else { name.clone() };

        let output = runtime.block_on(async {
            let record = create_record("T1", &name_for_record)?;
            let enrichment = create_failed(&record, Some(500))?;
            let expected = record.merchant_name.clone().unwrap_or_default();
            let output = write_rows(&[(record, enrichment)]).await?;

            Ok::<_, anyhow::Error>((output, expected))
        }).map_err(|error| TestCaseError::fail(error.to_string()))?;

        let (text, expected) = output;
        let (header, rows) = parse_output(&text).map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(rows.len(), 1);
        prop_assert_eq!(rows[0].len(), header.len());
        prop_assert_eq!(&rows[0][0], expected.as_str());
    }
}
