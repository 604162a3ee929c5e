use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::{absolute, Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::config::errors::ConfigError;
use crate::config::{Config, Environment};

struct DefaultArgs;

impl DefaultArgs {
    pub const BATCH_SIZE: usize = 10;
    pub const DELAY_SECONDS: f64 = 0.0;
    pub const TIMEOUT_SECONDS: u64 = 30;
    pub const LOG_LEVEL: &'static str = "info";
    pub const OUTPUT_SUFFIX: &'static str = ".output";
}

/// Categorise the transactions of a CSV file with the Triple enrichment API.
#[derive(Clone, Parser)]
#[command(name = "trx-categorisation", version)]
#[command(about = "Enrich every transaction of a CSV file and write one result row per transaction.")]
#[command(after_help = "Paths containing spaces must be quoted (e.g. \"my file.csv\").")]
pub struct Cli {
    /// Path to the input CSV file. Its header row must name the transaction columns.
    #[arg(value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Path for the output file. Default: <INPUT_FILE>.output
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Transactions enriched concurrently in one batch.
    #[arg(long, short = 'b', default_value_t = DefaultArgs::BATCH_SIZE)]
    pub batch_size: usize,

    /// Seconds to wait between two batches, to stay under the API rate limit.
    #[arg(long, short = 'd', default_value_t = DefaultArgs::DELAY_SECONDS, allow_negative_numbers = true)]
    pub delay: f64,

    /// API deployment to call.
    #[arg(long, short = 'e', value_enum, default_value_t = Environment::Sandbox)]
    pub environment: Environment,

    /// API token.
    #[arg(long, short = 't', env = "TRIPLE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL overriding the one selected by --environment.
    #[arg(long, env = "TRIPLE_API_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Per request timeout in seconds.
    #[arg(long, default_value_t = DefaultArgs::TIMEOUT_SECONDS)]
    pub timeout: u64,

    /// Do not log a progress line after every batch.
    #[arg(long)]
    pub no_progress: bool,

    /// Log level: error, warn, info, debug or trace.
    #[arg(long, short = 'l', default_value = DefaultArgs::LOG_LEVEL)]
    pub log_level: String
}

impl Cli {
    /// Output path, defaulting to the input path with `.output` appended.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let mut path = OsString::from(self.input.as_os_str());
            path.push(DefaultArgs::OUTPUT_SUFFIX);
            PathBuf::from(path)
        })
    }

    /// Validates every argument and produces the run configuration.
    ///
    /// # Errors
    /// Returns the first `ConfigError` found; nothing has been read or written at that point.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let input = resolve(&self.input)?;
        let output = resolve(&self.output_path())?;

        if !input.exists() {
            return Err(ConfigError::InputNotFound(input))
        }

        if !input.is_file() {
            return Err(ConfigError::InputNotAFile(input))
        }

        if input == output {
            return Err(ConfigError::SamePaths(input))
        }

        let batch_size = NonZeroUsize::new(self.batch_size).ok_or(ConfigError::InvalidBatchSize)?;

        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ConfigError::InvalidDelay(self.delay))
        }

        if self.timeout == 0 {
            return Err(ConfigError::InvalidTimeout)
        }

        let token = self.token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let endpoint = match self.endpoint.filter(|endpoint| !endpoint.trim().is_empty()) {
            Some(endpoint) if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") => {
                return Err(ConfigError::InvalidEndpoint(endpoint))
            }
            endpoint => endpoint
        };

        Ok(Config {
            input,
            output,
            batch_size,
            delay: Duration::from_secs_f64(self.delay),
            environment: self.environment,
            endpoint,
            timeout: Duration::from_secs(self.timeout),
            progress: !self.no_progress,
            token
        })
    }
}

fn resolve(path: &Path) -> Result<PathBuf, ConfigError> {
    absolute(path).map_err(|error| ConfigError::Resolve { path: path.to_path_buf(), error })
}
