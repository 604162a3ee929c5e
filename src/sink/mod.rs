mod columns;
mod csv_sink;
mod errors;
#[cfg(test)]
mod tests;

pub use csv_sink::CsvSink;
pub use errors::SinkError;
