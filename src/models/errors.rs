use thiserror::Error;

use crate::models::record::MAX_IDENTIFIER_LENGTH;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Row [{row}] has no transaction_id")]
    MissingIdentifier {
        row: u64
    },
    #[error("Row [{row}] has a transaction_id of {length} characters, the limit is {limit}", limit = MAX_IDENTIFIER_LENGTH)]
    IdentifierTooLong {
        row: u64,
        length: usize
    }
}
