mod cli;
mod errors;

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

pub use cli::Cli;

/// Which Triple API deployment to call.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, ValueEnum)]
pub enum Environment {
    #[default]
    Sandbox,
    Production
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://api.sandbox.tripledev.app/api",
            Self::Production => "https://api.triple.app/api"
        }
    }
}

/// Validated settings for one run. Built once from the command line and passed down explicitly.
#[derive(Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub batch_size: NonZeroUsize,
    pub delay: Duration,
    pub environment: Environment,
    /// Replaces the environment's base URL when set.
    pub endpoint: Option<String>,
    pub timeout: Duration,
    pub progress: bool,
    token: String
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.endpoint.as_deref().unwrap_or_else(|| self.environment.base_url())
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Config")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("batch_size", &self.batch_size)
            .field("delay", &self.delay)
            .field("environment", &self.environment)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("progress", &self.progress)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
