mod dispatcher;
mod errors;
mod pipeline;

pub use pipeline::Pipeline;
