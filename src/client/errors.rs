use thiserror::Error;

/// Failures that are not about the remote side, so no record could ever succeed after one.
///
/// Remote and transport failures never show up here, they become `Enrichment::Failed`.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Could not build the HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("Could not serialize transaction [{transaction_id}]: {error}")]
    Serialize {
        transaction_id: String,
        error: serde_json::Error
    },
    #[error("Could not build the request for transaction [{transaction_id}]: {error}")]
    Request {
        transaction_id: String,
        error: reqwest::Error
    }
}
