use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Record;

/// Successful response body of the enrichment endpoint.
///
/// The remote side omits or nulls whole sections depending on the features enabled for the
/// account, so every section and every leaf is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichedPayload {
    pub transaction_id: Option<String>,
    pub visual_enrichments: Option<VisualEnrichments>,
    pub merchant_location: Option<MerchantLocation>,
    pub subscriptions: Option<Subscriptions>,
    pub co2_footprint: Option<Co2Footprint>,
    pub updated: Option<String>,
    pub fraud: Option<Fraud>,
    pub categories: Option<Vec<Category>>,
    pub contact: Option<Contact>,
    pub payment_processor: Option<PaymentProcessor>
}

impl EnrichedPayload {
    /// Name of the n-th category label, the output keeps the first two.
    pub fn category(&self, index: usize) -> Option<&str> {
        self.categories.as_ref()?.get(index)?.name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualEnrichments {
    pub merchant_clean_name: Option<String>,
    pub merchant_logo_link: Option<String>,
    pub default_logo: Option<bool>,
    pub merchant_category: Option<String>,
    pub google_places_id: Option<String>,
    pub merchant_website: Option<String>,
    pub updated: Option<String>,
    pub brand_id: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantLocation {
    pub enabled: Option<bool>,
    pub coordinates: Option<MerchantCoordinates>,
    pub address: Option<MerchantAddress>,
    pub location_id: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantCoordinates {
    pub lat: Option<String>,
    pub lon: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantAddress {
    pub country: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub street: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscriptions {
    pub enabled: Option<bool>,
    pub is_recurring: Option<bool>
}

/// Estimated CO₂ emissions of the purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Footprint {
    pub enabled: Option<bool>,
    pub emissions: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fraud {
    pub enabled: Option<bool>,
    pub merchant_flagged: Option<bool>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub name: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub enabled: Option<bool>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentProcessor {
    pub enabled: Option<bool>,
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub brand_id: Option<String>
}

/// What was sent. Headers never include the authorization credential.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    pub body: Value,
    pub headers: Value,
    /// RFC 3339 UTC time the request was built.
    pub timestamp: String
}

/// What came back, `None` wherever the call failed before that part was available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub headers: Option<Value>
}

/// Audit trail of one remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExchange {
    pub request: RawRequest,
    pub response: RawResponse
}

/// A remote call that did not produce a usable payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureEnvelope {
    /// Human readable cause, logged but not written to the output.
    pub reason: String,
    pub raw: RawExchange
}

/// Result of enriching one record: a payload or a failure, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Enriched {
        payload: EnrichedPayload,
        raw: RawExchange
    },
    Failed(FailureEnvelope)
}

impl Enrichment {
    pub fn payload(&self) -> Option<&EnrichedPayload> {
        match self {
            Self::Enriched { payload, .. } => Some(payload),
            Self::Failed(_) => None
        }
    }

    pub fn failure(&self) -> Option<&FailureEnvelope> {
        match self {
            Self::Enriched { .. } => None,
            Self::Failed(envelope) => Some(envelope)
        }
    }

    pub fn raw(&self) -> &RawExchange {
        match self {
            Self::Enriched { raw, .. } => raw,
            Self::Failed(envelope) => &envelope.raw
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Self::Enriched { .. })
    }
}

/// A record paired with its enrichment, alive from dispatch until its row is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub record: Record,
    pub enrichment: Enrichment
}
