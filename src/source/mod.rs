mod batcher;
mod errors;
mod record_source;
#[cfg(test)]
mod tests;

pub use batcher::Batcher;
pub use errors::SourceError;
pub use record_source::RecordSource;
