//! Structured logging setup.
//!
//! # Component Targets
//!
//! | Target | Description |
//! |--------|-------------|
//! | `handlefi::bootstrap` | Token discovery and config reads |
//! | `handlefi::mirror` | Seeding, block application, regeneration |
//! | `handlefi::pricing` | Swap quotes |
//! | `handlefi::oracle` | Oracle requests and retries |
//! | `handlefi::pool` | Pool lifecycle and the max-amount-in cache |
//! | `handlefi::multicall` | Batched RPC reads |
//!
//! ```bash
//! # Debug only the mirror
//! RUST_LOG=info,handlefi::mirror=debug vault_quote quote ...
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,alloy_transport_http=warn";

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_enable_stdout")]
    pub enable_stdout: bool,

    #[serde(default)]
    pub stdout_format: LogFormat,

    /// Directory for daily-rotated JSON log files. No file output when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_level() -> String {
    DEFAULT_FILTER.to_string()
}

fn default_enable_stdout() -> bool {
    true
}

fn default_file_prefix() -> String {
    "handlefi.log".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            enable_stdout: default_enable_stdout(),
            stdout_format: LogFormat::default(),
            log_dir: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl LogConfig {
    /// JSON to stdout plus rotated files under `log_dir`.
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            stdout_format: LogFormat::Json,
            log_dir: Some(log_dir),
            ..Default::default()
        }
    }
}

/// Install the global subscriber.
///
/// The returned guards flush the file writer on drop and must be held for
/// the life of the program.
pub fn init_logging(
    config: &LogConfig,
    env_filter_override: Option<&str>,
) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = match env_filter_override {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
    };

    let stdout_for = |format: LogFormat| config.enable_stdout && config.stdout_format == format;
    let json = stdout_for(LogFormat::Json).then(|| fmt::layer().json());
    let compact = stdout_for(LogFormat::Compact).then(|| fmt::layer().compact());
    let pretty = stdout_for(LogFormat::Pretty).then(|| fmt::layer().with_target(false));

    let mut guards = Vec::new();
    let file = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false).json())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(compact)
        .with(pretty)
        .with(file)
        .try_init()?;

    if let Some(dir) = &config.log_dir {
        eprintln!("Logging to {}", dir.display());
    }
    Ok(guards)
}
