use std::fmt;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::errors::EnrichError;
use crate::client::Enricher;
use crate::models::{EnrichedPayload, Enrichment, FailureEnvelope, RawExchange, RawRequest, RawResponse, Record};

const ENRICH_PATH: &str = "/v1/enrich-transaction/";
const REDACTED: &str = "[REDACTED]";

/// HTTP client for the transaction enrichment endpoint.
///
/// Owns the API credential. Everything this client records about a call, on success or failure,
/// has the `Authorization` header removed and any other occurrence of the credential masked.
#[derive(Clone)]
pub struct EnrichmentClient {
    client: Client,
    endpoint: String,
    token: String
}

impl EnrichmentClient {
    /// Creates a client posting to `{base_url}/v1/enrich-transaction/`.
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EnrichError::Client)?;

        Ok(Self {
            client,
            endpoint: format!("{}{ENRICH_PATH}", base_url.trim_end_matches('/')),
            token
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn sanitize_headers(&self, headers: &HeaderMap) -> Value {
        let mut sanitized = Map::new();

        for (name, value) in headers {
            if *name == AUTHORIZATION {
                continue;
            }

            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();

            match sanitized.get_mut(name.as_str()) {
                Some(Value::String(existing)) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                _ => {
                    sanitized.insert(name.as_str().to_string(), Value::String(value));
                }
            }
        }

        self.redact(Value::Object(sanitized))
    }

    fn redact(&self, value: Value) -> Value {
        if self.token.is_empty() {
            return value
        }

        match value {
            Value::String(text) if text.contains(&self.token) => Value::String(text.replace(&self.token, REDACTED)),
            Value::Array(items) => Value::Array(items.into_iter().map(|item| self.redact(item)).collect()),
            Value::Object(fields) => Value::Object(fields.into_iter().map(|(key, item)| (key, self.redact(item))).collect()),
            other => other
        }
    }

    fn decode_body(&self, bytes: &[u8]) -> Option<Value> {
        if bytes.is_empty() {
            return None
        }

        let body = serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()));

        Some(self.redact(body))
    }
}

impl Enricher for EnrichmentClient {
    async fn enrich(&self, record: &Record) -> Result<Enrichment, EnrichError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let body = serde_json::to_value(record).map_err(|error| EnrichError::Serialize {
            transaction_id: record.transaction_id.clone(),
            error
        })?;

        let request = self.client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .json(&body)
            .build()
            .map_err(|error| EnrichError::Request {
                transaction_id: record.transaction_id.clone(),
                error
            })?;

        let request_headers = self.sanitize_headers(request.headers());
        let raw_request = RawRequest { body, headers: request_headers, timestamp };

        debug!("Enriching transaction [{}]", record.transaction_id);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                return Ok(failed(raw_request, RawResponse::default(), format!("Request failed: {error}")))
            }
        };

        let status = response.status();
        let mut raw_response = RawResponse {
            status: Some(status.as_u16()),
            body: None,
            headers: Some(self.sanitize_headers(response.headers()))
        };

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(error) => {
                return Ok(failed(raw_request, raw_response, format!("Could not read response body: {error}")))
            }
        };

        raw_response.body = self.decode_body(&bytes);

        if !status.is_success() {
            return Ok(failed(raw_request, raw_response, format!("Remote returned {status}")))
        }

        let Some(body) = raw_response.body.clone() else {
            return Ok(failed(raw_request, raw_response, "Remote returned an empty body".to_string()))
        };

        match serde_json::from_value::<EnrichedPayload>(body) {
            Ok(payload) => Ok(Enrichment::Enriched {
                payload,
                raw: RawExchange { request: raw_request, response: raw_response }
            }),
            Err(error) => Ok(failed(raw_request, raw_response, format!("Malformed response body: {error}")))
        }
    }
}

impl fmt::Debug for EnrichmentClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("EnrichmentClient")
            .field("endpoint", &self.endpoint)
            .field("token", &REDACTED)
            .finish()
    }
}

fn failed(request: RawRequest, response: RawResponse, reason: String) -> Enrichment {
    Enrichment::Failed(FailureEnvelope {
        reason,
        raw: RawExchange { request, response }
    })
}
