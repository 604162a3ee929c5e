mod enrichment;
mod errors;
mod record;

use serde::Serialize;

pub use enrichment::{EnrichedPayload, Enrichment, FailureEnvelope, Outcome, RawExchange, RawRequest, RawResponse};
pub use errors::RecordError;
pub use record::{RawRecord, Record};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[default]
    BankTransfer,
    CardTransaction,
    Invoice
}

impl TransactionType {
    /// Reads the column value case-insensitively, treating `-` as `_`.
    ///
    /// Anything missing or unrecognised falls back to `BANK_TRANSFER`.
    pub fn from_column(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default()
        };

        match value.trim().to_uppercase().replace('-', "_").as_str() {
            "CARD_TRANSACTION" => Self::CardTransaction,
            "INVOICE" => Self::Invoice,
            _ => Self::BankTransfer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "BANK_TRANSFER",
            Self::CardTransaction => "CARD_TRANSACTION",
            Self::Invoice => "INVOICE"
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Atm,
    Pos,
    Ecommerce
}

impl ChannelType {
    /// Unlike the transaction type there is no default channel: unknown values are absent.
    pub fn from_column(value: Option<&str>) -> Option<Self> {
        match value?.trim().to_uppercase().as_str() {
            "ATM" => Some(Self::Atm),
            "POS" => Some(Self::Pos),
            "ECOMMERCE" => Some(Self::Ecommerce),
            _ => None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atm => "ATM",
            Self::Pos => "POS",
            Self::Ecommerce => "ECOMMERCE"
        }
    }
}
