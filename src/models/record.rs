use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::errors::RecordError;
use crate::models::{ChannelType, TransactionType};

pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// A single row from the input CSV file, exactly as the reader saw it.
///
/// Every column is optional at this stage. Columns missing from a short row are
/// left unset and columns the file carries beyond this set are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub merchant_name: Option<String>,
    pub transaction_type: Option<String>,
    pub transaction_id: Option<String>,
    pub merchant_country: Option<String>,
    pub merchant_category_code: Option<String>,
    pub merchant_city: Option<String>,
    pub merchant_id: Option<String>,
    pub transaction_timestamp: Option<String>,
    pub transaction_amount: Option<String>,
    pub transaction_currency: Option<String>,
    pub transaction_reference_text: Option<String>,
    pub account_id: Option<String>,
    pub channel_type: Option<String>,
    pub vat: Option<String>
}

/// A validated transaction, serialized as-is as the enrichment request body.
///
/// `None` marks a column that was missing or blank in the input, which is
/// distinct from `Some(String::new())`; parsing never produces the latter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Merchant name or description.
    pub merchant_name: Option<String>,
    pub transaction_type: TransactionType,
    /// Identifier supplied by the API user, between 1 and 255 characters.
    pub transaction_id: String,
    /// ISO 3166 alpha-3 country code.
    pub merchant_country: Option<String>,
    /// Four digit merchant category code.
    pub merchant_category_code: Option<u32>,
    pub merchant_city: Option<String>,
    pub merchant_id: Option<String>,
    /// UTC timestamp of the purchase, `YYYY-mm-ddTHH:MM:SS[.sssssss]Z`.
    pub transaction_timestamp: Option<String>,
    pub transaction_amount: Option<String>,
    /// ISO 4217 currency code.
    pub transaction_currency: Option<String>,
    /// Reference text, only meaningful for bank transfers.
    pub transaction_reference_text: Option<String>,
    pub account_id: Option<String>,
    pub channel_type: Option<ChannelType>,
    /// Tax identification or VAT number.
    pub vat: Option<String>
}

impl Record {
    /// Validates a raw row into a record.
    ///
    /// `row` is the 1-based data row number and is only used for error and log context.
    ///
    /// # Errors
    /// Returns `RecordError` if the transaction id is missing, blank or longer than
    /// `MAX_IDENTIFIER_LENGTH` characters. No other column can fail a row.
    pub fn parse(raw: RawRecord, row: u64) -> Result<Self, RecordError> {
        let Some(transaction_id) = normalize(raw.transaction_id) else {
            return Err(RecordError::MissingIdentifier { row })
        };

        let length = transaction_id.chars().count();

        if length > MAX_IDENTIFIER_LENGTH {
            return Err(RecordError::IdentifierTooLong { row, length })
        }

        let merchant_category_code = parse_number(raw.merchant_category_code, row, &transaction_id);

        Ok(Self {
            merchant_name: normalize(raw.merchant_name),
            transaction_type: TransactionType::from_column(normalize(raw.transaction_type).as_deref()),
            merchant_country: normalize(raw.merchant_country),
            merchant_category_code,
            merchant_city: normalize(raw.merchant_city),
            merchant_id: normalize(raw.merchant_id),
            transaction_timestamp: normalize(raw.transaction_timestamp),
            transaction_amount: normalize(raw.transaction_amount),
            transaction_currency: normalize(raw.transaction_currency),
            transaction_reference_text: normalize(raw.transaction_reference_text),
            account_id: normalize(raw.account_id),
            channel_type: ChannelType::from_column(normalize(raw.channel_type).as_deref()),
            vat: normalize(raw.vat),
            transaction_id
        })
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();

    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

//NOTE: A value that is present but not a whole non-negative number is dropped rather than failing the row, the
//      warning is its only trace. Decimal notation such as `5411.0`, `+5411` or `5.411e3` is accepted.
fn parse_number(value: Option<String>, row: u64, transaction_id: &str) -> Option<u32> {
    let value = normalize(value)?;

    let number = value.parse::<f64>()
        .ok()
        .filter(|number| number.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(number));

    match number {
        Some(number) => Some(number as u32),
        None => {
            warn!("Row [{row}] transaction [{transaction_id}]: merchant_category_code '{value}' is not a whole number, treating it as absent");
            None
        }
    }
}
