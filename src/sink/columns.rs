use serde_json::Value;

use crate::models::{EnrichedPayload, RawExchange, Record};

pub type RecordColumn = (&'static str, fn(&Record) -> Option<String>);
pub type EnrichedColumn = (&'static str, fn(&EnrichedPayload) -> Option<String>);
pub type RawColumn = (&'static str, fn(&RawExchange) -> Option<String>);

pub static RECORD_COLUMNS: [RecordColumn; 14] = [
    ("merchant_name", |record| record.merchant_name.clone()),
    ("transaction_type", |record| Some(record.transaction_type.as_str().to_string())),
    ("transaction_id", |record| Some(record.transaction_id.clone())),
    ("merchant_country", |record| record.merchant_country.clone()),
    ("merchant_category_code", |record| record.merchant_category_code.map(|code| code.to_string())),
    ("merchant_city", |record| record.merchant_city.clone()),
    ("merchant_id", |record| record.merchant_id.clone()),
    ("transaction_timestamp", |record| record.transaction_timestamp.clone()),
    ("transaction_amount", |record| record.transaction_amount.clone()),
    ("transaction_currency", |record| record.transaction_currency.clone()),
    ("transaction_reference_text", |record| record.transaction_reference_text.clone()),
    ("account_id", |record| record.account_id.clone()),
    ("channel_type", |record| record.channel_type.map(|channel| channel.as_str().to_string())),
    ("vat", |record| record.vat.clone())
];

pub static ENRICHED_COLUMNS: [EnrichedColumn; 34] = [
    ("triple_transaction_id", |payload| payload.transaction_id.clone()),
    ("triple_visual_enrichments_merchant_clean_name", |payload| payload.visual_enrichments.as_ref()?.merchant_clean_name.clone()),
    ("triple_visual_enrichments_merchant_logo_link", |payload| payload.visual_enrichments.as_ref()?.merchant_logo_link.clone()),
    ("triple_visual_enrichments_default_logo", |payload| flag(payload.visual_enrichments.as_ref()?.default_logo)),
    ("triple_visual_enrichments_merchant_category", |payload| payload.visual_enrichments.as_ref()?.merchant_category.clone()),
    ("triple_visual_enrichments_google_places_id", |payload| payload.visual_enrichments.as_ref()?.google_places_id.clone()),
    ("triple_visual_enrichments_merchant_website", |payload| payload.visual_enrichments.as_ref()?.merchant_website.clone()),
    ("triple_visual_enrichments_updated", |payload| payload.visual_enrichments.as_ref()?.updated.clone()),
    ("triple_visual_enrichments_brand_id", |payload| payload.visual_enrichments.as_ref()?.brand_id.clone()),
    ("triple_merchant_location_enabled", |payload| flag(payload.merchant_location.as_ref()?.enabled)),
    ("triple_merchant_location_coordinates_lat", |payload| payload.merchant_location.as_ref()?.coordinates.as_ref()?.lat.clone()),
    ("triple_merchant_location_coordinates_lon", |payload| payload.merchant_location.as_ref()?.coordinates.as_ref()?.lon.clone()),
    ("triple_merchant_location_address_country", |payload| payload.merchant_location.as_ref()?.address.as_ref()?.country.clone()),
    ("triple_merchant_location_address_city", |payload| payload.merchant_location.as_ref()?.address.as_ref()?.city.clone()),
    ("triple_merchant_location_address_zip_code", |payload| payload.merchant_location.as_ref()?.address.as_ref()?.zip_code.clone()),
    ("triple_merchant_location_address_street", |payload| payload.merchant_location.as_ref()?.address.as_ref()?.street.clone()),
    ("triple_merchant_location_location_id", |payload| payload.merchant_location.as_ref()?.location_id.clone()),
    ("triple_subscriptions_enabled", |payload| flag(payload.subscriptions.as_ref()?.enabled)),
    ("triple_subscriptions_is_recurring", |payload| flag(payload.subscriptions.as_ref()?.is_recurring)),
    ("triple_co2_footprint_enabled", |payload| flag(payload.co2_footprint.as_ref()?.enabled)),
    ("triple_co2_footprint_emissions", |payload| payload.co2_footprint.as_ref()?.emissions.clone()),
    ("triple_updated", |payload| payload.updated.clone()),
    ("triple_fraud_enabled", |payload| flag(payload.fraud.as_ref()?.enabled)),
    ("triple_fraud_merchant_flagged", |payload| flag(payload.fraud.as_ref()?.merchant_flagged)),
    ("triple_category", |payload| payload.category(0).map(str::to_string)),
    ("triple_subcategory", |payload| payload.category(1).map(str::to_string)),
    ("triple_contact_enabled", |payload| flag(payload.contact.as_ref()?.enabled)),
    ("triple_contact_phone", |payload| payload.contact.as_ref()?.phone.clone()),
    ("triple_contact_email", |payload| payload.contact.as_ref()?.email.clone()),
    ("triple_contact_website", |payload| payload.contact.as_ref()?.website.clone()),
    ("triple_payment_processor_enabled", |payload| flag(payload.payment_processor.as_ref()?.enabled)),
    ("triple_payment_processor_name", |payload| payload.payment_processor.as_ref()?.name.clone()),
    ("triple_payment_processor_logo_url", |payload| payload.payment_processor.as_ref()?.logo_url.clone()),
    ("triple_payment_processor_brand_id", |payload| payload.payment_processor.as_ref()?.brand_id.clone())
];

pub static RAW_COLUMNS: [RawColumn; 6] = [
    ("triple_raw_request_body", |raw| Some(json_text(&raw.request.body))),
    ("triple_raw_request_headers", |raw| Some(json_text(&raw.request.headers))),
    ("triple_raw_request_timestamp", |raw| Some(raw.request.timestamp.clone())),
    ("triple_raw_response_status", |raw| raw.response.status.map(|status| status.to_string())),
    ("triple_raw_response_body", |raw| raw.response.body.as_ref().map(json_text)),
    ("triple_raw_response_headers", |raw| raw.response.headers.as_ref().map(json_text))
];

/// Header row: record columns, then enrichment columns, then the raw audit columns.
pub fn header() -> impl Iterator<Item = &'static str> {
    RECORD_COLUMNS.iter().map(|(name, _)| *name)
        .chain(ENRICHED_COLUMNS.iter().map(|(name, _)| *name))
        .chain(RAW_COLUMNS.iter().map(|(name, _)| *name))
}

fn flag(value: Option<bool>) -> Option<String> {
    value.map(|value| value.to_string())
}

fn json_text(value: &Value) -> String {
    value.to_string()
}
